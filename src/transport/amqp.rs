//! RabbitMQ transport using lapin.
//!
//! Every sensor has its own durable queue on the default exchange. The
//! publisher declares all three and publishes with the queue name as routing
//! key. Each consumer opens its own connection, declares its queue, sets a
//! prefetch of one, and acknowledges a delivery only after the reading has
//! been processed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
    BasicRejectOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use smokewatch_types::Sensor;
use tracing::{error, info, warn};

use super::MessageSink;
use crate::config::QueueNames;
use crate::consumer::{Consumer, ConsumerStats, Disposition};

/// Open a connection to the broker.
pub async fn connect(url: &str) -> Result<Connection> {
    Connection::connect(url, ConnectionProperties::default())
        .await
        .with_context(|| format!("Connection to RabbitMQ server at {} failed", url))
}

/// Declare a durable queue.
pub async fn declare_queue(channel: &Channel, queue: &str) -> Result<()> {
    channel
        .queue_declare(
            queue,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
        .with_context(|| format!("Failed to declare queue {}", queue))?;
    Ok(())
}

/// A sink that publishes records onto the per-sensor RabbitMQ queues.
#[derive(Debug)]
pub struct AmqpSink {
    connection: Connection,
    channel: Channel,
    queues: QueueNames,
    description: String,
}

impl AmqpSink {
    /// Connect and declare all three queues.
    pub async fn connect(url: &str, queues: QueueNames) -> Result<Self> {
        let connection = connect(url).await?;
        let channel = connection
            .create_channel()
            .await
            .context("Failed to open channel")?;

        for sensor in Sensor::ALL {
            declare_queue(&channel, queues.for_sensor(sensor)).await?;
        }

        Ok(Self {
            connection,
            channel,
            queues,
            description: format!("amqp: {}", url),
        })
    }

    /// Close the connection cleanly.
    pub async fn close(self) -> Result<()> {
        self.connection
            .close(200, "emitter finished")
            .await
            .context("Failed to close connection")
    }
}

#[async_trait]
impl MessageSink for AmqpSink {
    async fn send(&mut self, sensor: Sensor, record: &str) -> Result<()> {
        let queue = self.queues.for_sensor(sensor);
        self.channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                record.as_bytes(),
                BasicProperties::default(),
            )
            .await
            .with_context(|| format!("Failed to publish to {}", queue))?
            .await
            .with_context(|| format!("Publish to {} was not confirmed", queue))?;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Consume one sensor's queue until the broker closes the stream.
///
/// Returns an error if the connection fails or the consumer stops on a
/// malformed record. A stopped consumer leaves that record unacknowledged, so
/// the broker redelivers it once the connection is gone.
pub async fn consume(url: &str, queue: &str, mut consumer: Consumer) -> Result<ConsumerStats> {
    let sensor = consumer.sensor();
    let connection = connect(url).await?;
    let channel = connection
        .create_channel()
        .await
        .context("Failed to open channel")?;

    declare_queue(&channel, queue).await?;
    channel
        .basic_qos(1, BasicQosOptions::default())
        .await
        .context("Failed to set prefetch")?;

    let tag = format!("smokewatch-{}", queue);
    let mut deliveries = channel
        .basic_consume(
            queue,
            &tag,
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .with_context(|| format!("Failed to consume from {}", queue))?;

    info!(
        %sensor,
        queue,
        period = ?consumer.monitor().rule().period(),
        capacity = consumer.monitor().window().capacity(),
        "Waiting for messages"
    );

    while let Some(delivery) = deliveries.next().await {
        let delivery = delivery.with_context(|| format!("Delivery from {} failed", queue))?;

        match consumer.dispose(&delivery.data) {
            Disposition::Ack => delivery
                .acker
                .ack(BasicAckOptions::default())
                .await
                .context("Failed to acknowledge message")?,
            Disposition::Reject => delivery
                .acker
                .reject(BasicRejectOptions { requeue: false })
                .await
                .context("Failed to reject message")?,
            Disposition::Stop(e) => {
                if let Err(close_err) = connection.close(200, "consumer stopped").await {
                    warn!(%sensor, queue, "Failed to close connection: {}", close_err);
                }
                return Err(e).with_context(|| format!("Consumer for {} stopped", queue));
            }
        }
    }

    error!(%sensor, queue, "Delivery stream closed");
    Ok(consumer.stats())
}
