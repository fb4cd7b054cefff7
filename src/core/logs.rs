//! `logs` handler. Log streaming is not offered from chat yet.

use tracing::info;

use crate::delivery::{DeliveryTarget, ResponseDelivery};
use crate::suggest::send_error;
use crate::types::CommandMeta;

pub async fn get_logs(delivery: &dyn ResponseDelivery, meta: &CommandMeta, options: &str) {
    info!(user = %meta.user_name, options, "logs command requested");
    send_error(
        delivery,
        &DeliveryTarget::ReplyUrl(meta.reply_url.clone()),
        &format!("Not implemented. Options: {}", options),
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{meta, RecordingDelivery};

    #[tokio::test]
    async fn test_logs_reports_not_implemented() {
        let delivery = RecordingDelivery::default();
        get_logs(&delivery, &meta(), "api-default -n 20").await;

        assert_eq!(
            delivery.ephemeral_texts(),
            vec!["Not implemented. Options: api-default -n 20".to_string()]
        );
    }
}
