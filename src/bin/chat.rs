// Line-oriented chat front end over the coordinator

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use cloudmesh::agents::Reply;
use cloudmesh::bootstrap::build_network;
use cloudmesh::config::AppConfig;

const EXAMPLES: &[&str] = &[
    "create ec2 instance",
    "create ec2 instance t2.small",
    "list instances",
    "stop instance i-1234567890abcdef0",
    "terminate instance i-1234567890abcdef0",
    "create s3 bucket my-unique-bucket-name",
    "create s3 bucket my-bucket in us-west-2",
    "list buckets",
    "list objects in bucket my-bucket",
    "delete bucket my-bucket",
];

fn render(reply: &Reply) -> String {
    if let Some(error) = reply.error_text() {
        return format!("\nError: {}\n", error);
    }

    if reply.get("success") == Some(&Value::Bool(true)) {
        let mut out = String::from("\nSuccess!\n");
        for (key, value) in reply.fields().iter().filter(|(key, _)| *key != "success") {
            match value {
                Value::Array(_) | Value::Object(_) => {
                    let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
                    out.push_str(&format!("{}:\n{}\n", key, pretty));
                }
                Value::String(text) => out.push_str(&format!("{}: {}\n", key, text)),
                other => out.push_str(&format!("{}: {}\n", key, other)),
            }
        }
        return out;
    }

    match reply.message_text() {
        Some(message) => format!("\n{}\n", message),
        None => format!(
            "\n{}\n",
            serde_json::to_string_pretty(reply).unwrap_or_default()
        ),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they do not interleave with the conversation
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;
    let network = build_network(&config)?;
    let coordinator = network.coordinator();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(
            b"Cloudmesh Multi-Agent Chat\n\
              Type your commands or 'help' for examples\n\
              Type 'quit' or 'exit' to stop\n\n",
        )
        .await?;

    loop {
        stdout.write_all(b"You: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "quit" | "exit" | "q" => break,
            "help" => {
                let mut out = String::from("\nExample commands:\n");
                for example in EXAMPLES {
                    out.push_str(&format!("  - {}\n", example));
                }
                out.push('\n');
                stdout.write_all(out.as_bytes()).await?;
            }
            _ => {
                let reply = coordinator.process_request(input).await;
                stdout.write_all(render(&reply).as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
        }
    }

    stdout.write_all(b"\nGoodbye!\n").await?;
    stdout.flush().await?;
    Ok(())
}
