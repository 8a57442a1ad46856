//! Example: Read documents from every configured platform
//!
//! Run with: cargo run -p prdkit --example read_documents -- <URL>...
//!
//! Credentials come from CONFLUENCE_USERNAME, CONFLUENCE_TOKEN,
//! NOTION_TOKEN and GOOGLE_ACCESS_TOKEN. Set RUST_LOG=prdkit=debug to see
//! source dispatch and API requests.

use prdkit::{read_document, ConfluenceCredentials, Credentials};
use std::env;

fn credentials_from_env() -> Credentials {
    let confluence = match (env::var("CONFLUENCE_USERNAME"), env::var("CONFLUENCE_TOKEN")) {
        (Ok(username), Ok(token)) => Some(ConfluenceCredentials { username, token }),
        _ => None,
    };
    Credentials {
        confluence,
        notion_token: env::var("NOTION_TOKEN").ok(),
        google_access_token: env::var("GOOGLE_ACCESS_TOKEN").ok(),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let urls: Vec<String> = env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("Usage: read_documents <URL>...");
        std::process::exit(1);
    }

    let credentials = credentials_from_env();
    let mut failed = 0;

    for url in &urls {
        println!("== {}", url);
        match read_document(url, &credentials).await {
            Ok(doc) => {
                let preview: String = doc.content.chars().take(300).collect();
                println!("id:    {}", doc.id);
                println!("title: {}", doc.title);
                println!("url:   {}", doc.url);
                println!("chars: {}\n", doc.content.chars().count());
                println!("{}\n", preview);
            }
            Err(e) => {
                failed += 1;
                println!("error: {}\n", e);
            }
        }
    }

    println!("{} read, {} failed", urls.len() - failed, failed);
}
