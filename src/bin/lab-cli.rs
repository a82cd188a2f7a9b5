use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "lab-cli")]
#[command(about = "Client for driving a qos-lab-api node", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check liveness
    Health,
    /// Hash n random bytes on the node
    Read {
        #[arg(short)]
        n: Option<u64>,
    },
    /// Spin on the node, optionally failing
    Work {
        #[arg(long)]
        ms: Option<u64>,
        #[arg(long)]
        jitter: Option<u64>,
        #[arg(long)]
        fail_prob: Option<f64>,
    },
    /// Fire concurrent requests and report latency percentiles
    Bench {
        /// Path and query, e.g. "/work?ms=20&jitter=10"
        #[arg(short, long, default_value = "/work")]
        path: String,
        #[arg(short, long, default_value_t = 20)]
        concurrency: usize,
        /// Requests per concurrent task
        #[arg(short, long, default_value_t = 50)]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Read { n } => {
            let mut query = Vec::new();
            if let Some(n) = n {
                query.push(("n", n.to_string()));
            }
            let res = client
                .get(format!("{}/read", cli.url))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Work { ms, jitter, fail_prob } => {
            let mut query = Vec::new();
            if let Some(ms) = ms {
                query.push(("ms", ms.to_string()));
            }
            if let Some(jitter) = jitter {
                query.push(("jitter", jitter.to_string()));
            }
            if let Some(p) = fail_prob {
                query.push(("fail_prob", p.to_string()));
            }
            let res = client
                .get(format!("{}/work", cli.url))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Bench { path, concurrency, requests } => {
            bench(client, format!("{}{}", cli.url, path), concurrency, requests).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: node returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

async fn bench(
    client: reqwest::Client,
    url: String,
    concurrency: usize,
    requests: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let total = concurrency * requests;
    let start = Instant::now();

    let mut tasks = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let client = client.clone();
        let url = url.clone();
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(requests);
            let mut failures = 0usize;
            for _ in 0..requests {
                let req_start = Instant::now();
                match client.get(&url).send().await {
                    Ok(res) if res.status().is_success() => latencies.push(req_start.elapsed()),
                    _ => failures += 1,
                }
            }
            (latencies, failures)
        }));
    }

    let mut latencies = Vec::with_capacity(total);
    let mut failures = 0;
    for task in tasks {
        let (task_latencies, task_failures) = task.await?;
        latencies.extend(task_latencies);
        failures += task_failures;
    }

    let duration = start.elapsed();
    latencies.sort();

    println!("\n--- Bench Results ---");
    println!("Target:         {}", url);
    println!("Total Requests: {}", total);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", total as f64 / duration.as_secs_f64());
    println!("Success/Fail:   {}/{}", latencies.len(), failures);
    println!("P50 Latency:    {:?}", percentile(&latencies, 0.50));
    println!("P95 Latency:    {:?}", percentile(&latencies, 0.95));
    println!("P99 Latency:    {:?}", percentile(&latencies, 0.99));
    println!("---------------------\n");

    Ok(())
}

/// `sorted` must be ascending. Empty input yields zero.
fn percentile(sorted: &[Duration], q: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64 * q) as usize).min(sorted.len() - 1);
    sorted[idx]
}
