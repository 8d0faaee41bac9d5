//! Kafka message source
//!
//! Wraps an rdkafka `StreamConsumer`. Offsets are committed by the client's
//! auto-commit; new consumer groups start from the latest offset.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;

use crate::config::BrokerConfig;

use super::errors::{BrokerError, BrokerResult};
use super::MessageSource;

/// How long startup waits for cluster metadata before giving up.
const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// Create the consumer and confirm the cluster is reachable.
    pub fn connect(config: &BrokerConfig) -> BrokerResult<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("security.protocol", &config.security_protocol)
            .set("sasl.mechanisms", &config.sasl_mechanism)
            .set("sasl.username", &config.username)
            .set("sasl.password", config.password.expose())
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", "latest")
            .create()
            .map_err(|e| BrokerError::Connect(e.to_string()))?;

        consumer
            .fetch_metadata(None, METADATA_TIMEOUT)
            .map_err(|e| BrokerError::Connect(e.to_string()))?;

        Ok(Self { consumer })
    }
}

impl MessageSource for KafkaSource {
    fn subscribe(&mut self, topic: &str) -> BrokerResult<()> {
        self.consumer
            .subscribe(&[topic])
            .map_err(|e| BrokerError::Subscribe {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }

    async fn poll(&mut self, timeout: Duration) -> BrokerResult<Option<Vec<u8>>> {
        match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_elapsed) => Ok(None),
            Ok(Err(e)) => Err(BrokerError::Poll(e.to_string())),
            Ok(Ok(message)) => Ok(Some(message.payload().map(<[u8]>::to_vec).unwrap_or_default())),
        }
    }

    fn close(&mut self) {
        self.consumer.unsubscribe();
    }
}
