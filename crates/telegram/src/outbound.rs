use {
    async_trait::async_trait,
    teloxide::{
        payloads::{AnswerCallbackQuerySetters, SendMessageSetters},
        prelude::*,
        types::{ChatMemberKind, InlineKeyboardMarkup, MessageId, Recipient},
    },
    tracing::debug,
};

use joingate_config::ChannelConfig;

use crate::{
    Result,
    api::{BotApi, MembershipStatus},
};

/// [`BotApi`] backed by a live teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramApi {
    bot: Bot,
}

impl TelegramApi {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Address a channel by numeric ID when it has one, by `@username` otherwise.
fn recipient(channel: &ChannelConfig) -> Recipient {
    match channel.numeric_id() {
        Some(id) => Recipient::Id(ChatId(id)),
        None => Recipient::ChannelUsername(channel.chat.clone()),
    }
}

fn status_of(kind: &ChatMemberKind) -> MembershipStatus {
    match kind {
        ChatMemberKind::Owner { .. } => MembershipStatus::Creator,
        ChatMemberKind::Administrator { .. } => MembershipStatus::Administrator,
        ChatMemberKind::Member { .. } => MembershipStatus::Member,
        ChatMemberKind::Restricted { .. } => MembershipStatus::Restricted,
        ChatMemberKind::Left { .. } => MembershipStatus::Left,
        ChatMemberKind::Banned { .. } => MembershipStatus::Banned,
    }
}

#[async_trait]
impl BotApi for TelegramApi {
    async fn member_status(
        &self,
        channel: &ChannelConfig,
        user_id: i64,
    ) -> Result<MembershipStatus> {
        let member = self
            .bot
            .get_chat_member(recipient(channel), UserId(user_id as u64))
            .await?;
        let status = status_of(&member.kind);
        debug!(user_id, channel = %channel.chat, %status, "fetched chat member");
        Ok(status)
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut req = self.bot.send_message(ChatId(chat_id), text);
        if let Some(kb) = keyboard {
            req = req.reply_markup(kb);
        }
        req.await?;
        Ok(())
    }

    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str) -> Result<()> {
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), text)
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str, alert: Option<&str>) -> Result<()> {
        let mut req = self.bot.answer_callback_query(query_id);
        if let Some(text) = alert {
            req = req.text(text).show_alert(true);
        }
        req.await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use {
        axum::{Json, Router, body::Bytes, extract::State, http::Uri, routing::post},
        serde_json::{Value, json},
        teloxide::types::InlineKeyboardButton,
        tokio::sync::oneshot,
    };

    use super::*;

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        method: String,
        body: Value,
    }

    #[derive(Clone)]
    struct MockTelegramApi {
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
        member_status: Option<&'static str>,
    }

    fn message_result(text: &str) -> Value {
        json!({
            "message_id": 1,
            "date": 1,
            "chat": { "id": 42, "type": "private", "first_name": "Alice" },
            "text": text,
        })
    }

    async fn telegram_api_handler(
        State(state): State<MockTelegramApi>,
        uri: Uri,
        body: Bytes,
    ) -> Json<Value> {
        let method = uri
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        state.requests.lock().unwrap().push(CapturedRequest {
            method: method.clone(),
            body,
        });

        let response = match method.as_str() {
            "getchatmember" => match state.member_status {
                Some(status) => json!({
                    "ok": true,
                    "result": {
                        "user": { "id": 1001, "is_bot": false, "first_name": "Alice" },
                        "status": status,
                    },
                }),
                None => json!({
                    "ok": false,
                    "error_code": 400,
                    "description": "Bad Request: user not found",
                }),
            },
            "sendmessage" | "editmessagetext" => json!({
                "ok": true,
                "result": message_result("ok"),
            }),
            _ => json!({ "ok": true, "result": true }),
        };
        Json(response)
    }

    struct MockServer {
        api: TelegramApi,
        requests: Arc<Mutex<Vec<CapturedRequest>>>,
        shutdown: oneshot::Sender<()>,
        task: tokio::task::JoinHandle<()>,
    }

    impl MockServer {
        async fn start(member_status: Option<&'static str>) -> Self {
            let requests = Arc::new(Mutex::new(Vec::new()));
            let app = Router::new()
                .route("/{*path}", post(telegram_api_handler))
                .with_state(MockTelegramApi {
                    requests: Arc::clone(&requests),
                    member_status,
                });

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind test listener");
            let addr = listener.local_addr().expect("local addr");
            let (shutdown, shutdown_rx) = oneshot::channel::<()>();
            let task = tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve mock telegram api");
            });

            let api_url = reqwest::Url::parse(&format!("http://{addr}/")).expect("parse api url");
            let bot = Bot::new("test-token").set_api_url(api_url);
            Self {
                api: TelegramApi::new(bot),
                requests,
                shutdown,
                task,
            }
        }

        fn requests(&self) -> Vec<CapturedRequest> {
            self.requests.lock().unwrap().clone()
        }

        async fn stop(self) {
            let _ = self.shutdown.send(());
            self.task.await.expect("server join");
        }
    }

    #[test]
    fn recipient_by_username_or_id() {
        assert!(matches!(
            recipient(&ChannelConfig::new("@news")),
            Recipient::ChannelUsername(ref name) if name == "@news"
        ));
        assert!(matches!(
            recipient(&ChannelConfig::new("-100123")),
            Recipient::Id(ChatId(-100123))
        ));
    }

    #[tokio::test]
    async fn member_status_parses_member() {
        let server = MockServer::start(Some("member")).await;
        let status = server
            .api
            .member_status(&ChannelConfig::new("@news"), 1001)
            .await
            .unwrap();
        assert_eq!(status, MembershipStatus::Member);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "getchatmember");
        assert_eq!(requests[0].body["chat_id"], "@news");
        assert_eq!(requests[0].body["user_id"], 1001);
        server.stop().await;
    }

    #[tokio::test]
    async fn member_status_parses_left() {
        let server = MockServer::start(Some("left")).await;
        let status = server
            .api
            .member_status(&ChannelConfig::new("-100123"), 1001)
            .await
            .unwrap();
        assert_eq!(status, MembershipStatus::Left);
        server.stop().await;
    }

    #[tokio::test]
    async fn member_status_surfaces_api_error() {
        let server = MockServer::start(None).await;
        let result = server
            .api
            .member_status(&ChannelConfig::new("@news"), 1001)
            .await;
        assert!(matches!(result, Err(crate::Error::Telegram(_))));
        server.stop().await;
    }

    #[tokio::test]
    async fn send_text_with_keyboard() {
        let server = MockServer::start(None).await;
        let kb = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "✅ Check", "check",
        )]]);
        server.api.send_text(42, "hello", Some(kb)).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].method, "sendmessage");
        assert_eq!(requests[0].body["chat_id"], 42);
        assert_eq!(requests[0].body["text"], "hello");
        assert_eq!(
            requests[0].body["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "check"
        );
        server.stop().await;
    }

    #[tokio::test]
    async fn edit_text_targets_message() {
        let server = MockServer::start(None).await;
        server.api.edit_text(42, 7, "✅ Access granted!").await.unwrap();

        let requests = server.requests();
        assert_eq!(requests[0].method, "editmessagetext");
        assert_eq!(requests[0].body["chat_id"], 42);
        assert_eq!(requests[0].body["message_id"], 7);
        assert_eq!(requests[0].body["text"], "✅ Access granted!");
        server.stop().await;
    }

    #[tokio::test]
    async fn answer_callback_with_and_without_alert() {
        let server = MockServer::start(None).await;
        server.api.answer_callback("q1", None).await.unwrap();
        server
            .api
            .answer_callback("q2", Some("You haven't joined both channels."))
            .await
            .unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, "answercallbackquery");
        assert_eq!(requests[0].body["callback_query_id"], "q1");
        assert!(requests[0].body.get("show_alert").is_none());
        assert_eq!(requests[1].body["show_alert"], true);
        assert_eq!(
            requests[1].body["text"],
            "You haven't joined both channels."
        );
        server.stop().await;
    }
}
