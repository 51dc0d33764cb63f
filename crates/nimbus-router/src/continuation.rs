// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State continuation handling.
//!
//! The router has already taken the pending state when this runs; a
//! continuation that needs another turn re-sets the state itself.

use std::sync::Arc;

use nimbus_core::{CommandContext, Jid, NimbusError, OutboundPayload, SendOptions};
use nimbus_session::{ConnectionSupervisor, Pending};

use crate::router::MessageRouter;

impl MessageRouter {
    pub(crate) async fn continue_pending(
        &self,
        session: &Arc<ConnectionSupervisor>,
        ctx: &CommandContext,
        pending: Pending,
        text: &str,
    ) -> Result<(), NimbusError> {
        match pending {
            Pending::StkPhone { amount } => {
                self.process_stk_push(session, ctx, text.trim(), amount).await
            }
            Pending::StkAmount => {
                let amount: f64 = match text.trim().parse() {
                    Ok(amount) => amount,
                    Err(_) => {
                        // Invalid input re-prompts without discarding the flow.
                        session
                            .user_states()
                            .set(&ctx.event.sender, Pending::StkAmount);
                        ctx.reply("❌ Invalid amount. Please enter a number.").await?;
                        return Ok(());
                    }
                };
                ctx.reply(format!("Enter phone number for KES {amount} STK:"))
                    .await?;
                session
                    .user_states()
                    .set(&ctx.event.sender, Pending::StkPhone { amount });
                Ok(())
            }
            Pending::TxReference => self.check_transaction(session, ctx, text.trim()).await,
            Pending::CustomTagMessage { participants } => {
                self.send_custom_tag(ctx, &participants, text).await
            }
        }
    }

    async fn send_custom_tag(
        &self,
        ctx: &CommandContext,
        participants: &[Jid],
        message: &str,
    ) -> Result<(), NimbusError> {
        let text = format!(
            "{message}\n\n🏷️ Tagged by: @{}",
            ctx.event.sender.user()
        );
        ctx.socket
            .send(
                &ctx.event.from,
                OutboundPayload::Mentions {
                    text,
                    mentions: participants.to_vec(),
                },
                SendOptions {
                    quoted: Some(ctx.event.key.clone()),
                    ..SendOptions::default()
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::tests::rig;
    use nimbus_core::OutboundPayload;
    use nimbus_test_utils::EventBuilder;

    #[tokio::test]
    async fn valid_amount_advances_to_phone_prompt() {
        let rig = rig();
        let event = EventBuilder::dm().text("250").build();
        rig.session
            .user_states()
            .set(&event.sender, Pending::StkAmount);

        rig.dispatch(event.clone()).await;

        assert_eq!(
            rig.session.user_states().get(&event.sender),
            Some(Pending::StkPhone { amount: 250.0 })
        );
        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("Enter phone number for KES 250")),
            "got: {texts:?}"
        );
    }

    #[tokio::test]
    async fn invalid_amount_keeps_the_flow_alive() {
        let rig = rig();
        let event = EventBuilder::dm().text("lots").build();
        rig.session
            .user_states()
            .set(&event.sender, Pending::StkAmount);

        rig.dispatch(event.clone()).await;

        assert_eq!(
            rig.session.user_states().get(&event.sender),
            Some(Pending::StkAmount)
        );
        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("Invalid amount")),
            "got: {texts:?}"
        );

        // A valid retry then advances to the phone prompt.
        rig.dispatch(EventBuilder::dm().text("75").build()).await;
        assert_eq!(
            rig.session.user_states().get(&event.sender),
            Some(Pending::StkPhone { amount: 75.0 })
        );
    }

    #[tokio::test]
    async fn phone_continuation_is_consumed_even_on_failure() {
        let rig = rig();
        let event = EventBuilder::dm().text("0712345678").build();
        rig.session
            .user_states()
            .set(&event.sender, Pending::StkPhone { amount: 100.0 });

        // Payments are disabled in the rig, so the push fails, but the
        // state is consumed either way.
        rig.dispatch(event.clone()).await;

        assert!(rig.session.user_states().get(&event.sender).is_none());
        let texts = rig.socket.sent_texts().await;
        assert!(
            texts.iter().any(|t| t.contains("STK Push Failed")),
            "got: {texts:?}"
        );
    }

    #[tokio::test]
    async fn custom_tag_message_mentions_everyone() {
        let rig = rig();
        let members = vec![
            Jid::new("254700000001@s.whatsapp.net"),
            Jid::new("254700000002@s.whatsapp.net"),
        ];
        let event = EventBuilder::group().text("Meeting at noon").build();
        rig.session.user_states().set(
            &event.sender,
            Pending::CustomTagMessage {
                participants: members.clone(),
            },
        );

        rig.dispatch(event.clone()).await;

        assert!(rig.session.user_states().get(&event.sender).is_none());
        let sent = rig.socket.sent_messages().await;
        let blast = sent
            .iter()
            .find_map(|s| match &s.payload {
                OutboundPayload::Mentions { text, mentions } => Some((text.clone(), mentions.clone())),
                _ => None,
            })
            .expect("mention blast sent");
        assert!(blast.0.contains("Meeting at noon"));
        assert!(blast.0.contains("Tagged by:"));
        assert_eq!(blast.1, members);
    }
}
