use std::io;

use smslink_bulk::{BulkPackage, Protocol, SmsLinkClient, UnixTimestamp};
use tracing_subscriber::EnvFilter;

fn required(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let connection_id = required("SMSLINK_CONNECTION_ID")?;
    let password = required("SMSLINK_PASSWORD")?;
    let receivers = required("SMSLINK_RECEIVERS")?;
    let message = std::env::var("SMSLINK_MESSAGE")
        .unwrap_or_else(|_| "Hello from the smslink-bulk demo.".to_owned());
    let sender = std::env::var("SMSLINK_SENDER").unwrap_or_else(|_| "numeric".to_owned());
    let live = std::env::var("SMSLINK_LIVE").is_ok_and(|value| value == "1");

    let mut client = SmsLinkClient::from_credentials(connection_id, password, !live)?;
    if let Ok(protocol) = std::env::var("SMSLINK_PROTOCOL") {
        client.set_protocol(protocol.parse::<Protocol>()?);
    }

    let mut package = BulkPackage::new();
    for (idx, receiver) in receivers.split(',').enumerate() {
        package.insert_message(
            &(idx + 1).to_string(),
            receiver,
            &sender,
            &message,
            UnixTimestamp::IMMEDIATE,
        )?;
    }

    if let Err(err) = client.send_package(&mut package).await {
        eprintln!("{}", package.result().error_message.as_deref().unwrap_or_default());
        return Err(err.into());
    }

    let result = package.result();
    println!(
        "package {} accepted in {:.2}s",
        result
            .remote_package_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
        result.elapsed_seconds.unwrap_or_default()
    );
    for entry in package.entries() {
        match result.outcome(entry.local_id()) {
            Some(outcome) => println!(
                "{} -> {}: message {} status {:?}",
                entry.local_id(),
                entry.receiver().as_str(),
                outcome.remote_message_id,
                outcome.status.known()
            ),
            None => println!("{} -> {}: no outcome", entry.local_id(), entry.receiver().as_str()),
        }
    }

    Ok(())
}
