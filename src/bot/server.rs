use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{Envelope, Reply, Responder};
use crate::config::Config;
use crate::error::Result;
use crate::renderer::markdown;
use crate::telegram::protocol::Update;
use crate::telegram::BotClient;

/// Pause after a failed getUpdates before polling again
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Run the long-polling bot until Ctrl-C.
///
/// Updates are handled one at a time, so the upload registry only ever
/// sees one writer.
pub async fn run(config: &Config) -> Result<()> {
    let token = config.require_bot_token()?;
    let client = BotClient::new(token, config.poll_timeout_secs);
    let responder = Responder::from_config(config);

    info!(
        sources = config.sources.len(),
        admin_chat = ?config.admin_chat_id,
        uploads = %config.uploads_path().display(),
        "scenebot started"
    );

    let mut offset: Option<i64> = None;
    loop {
        let polled = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
            polled = client.get_updates(offset, config.poll_timeout_secs) => polled,
        };

        match polled {
            Ok(updates) => offset = dispatch(&client, &responder, updates, offset).await,
            Err(e) => {
                warn!(error = %e, "getUpdates failed");
                tokio::time::sleep(POLL_ERROR_PAUSE).await;
            }
        }
    }
}

/// Handle a polled batch in order, returning the offset that acknowledges it
async fn dispatch(
    client: &BotClient,
    responder: &Responder,
    updates: Vec<Update>,
    mut offset: Option<i64>,
) -> Option<i64> {
    for update in updates {
        offset = Some(update.update_id + 1);
        let Some(message) = update.message else {
            continue;
        };
        let envelope = Envelope::from_message(&message);
        debug!(
            update_id = update.update_id,
            chat_id = envelope.chat_id,
            has_document = envelope.document.is_some(),
            "handling update"
        );
        let reply = responder.handle(&envelope).await;
        deliver(client, envelope.chat_id, reply).await;
    }
    offset
}

async fn deliver(client: &BotClient, chat_id: i64, reply: Reply) {
    match reply {
        Reply::Text(text) | Reply::NotFound(text) => send_text(client, chat_id, &text).await,
        Reply::Forward(artifact) => {
            let caption = markdown::render_caption(&artifact.name);
            if let Err(e) = client
                .send_document(chat_id, &artifact.location, &caption)
                .await
            {
                warn!(name = %artifact.name, error = %e, "sendDocument failed");
                send_text(client, chat_id, &markdown::render_send_failed(&artifact.name)).await;
            }
        }
        Reply::ForwardHandle { name, handle } => {
            let caption = markdown::render_caption(&name);
            if let Err(e) = client.send_document(chat_id, &handle, &caption).await {
                warn!(name = %name, error = %e, "sendDocument by file id failed");
                send_text(client, chat_id, &markdown::render_send_failed(&name)).await;
            }
        }
        Reply::Ignore => {}
    }
}

async fn send_text(client: &BotClient, chat_id: i64, text: &str) {
    if let Err(e) = client.send_message(chat_id, text).await {
        error!(chat_id, error = %e, "sendMessage failed");
    }
}
