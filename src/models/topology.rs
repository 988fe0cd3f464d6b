use lapin::types::{AMQPValue, FieldTable};

pub const QUEUE_TYPE: &str = "quorum";
pub const DELIVERY_LIMIT: i32 = 10;
pub const PREFETCH_COUNT: u16 = 1;

/// The durable quorum work queue the relay consumes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSpec {
    pub name: String,
    pub durable: bool,
    pub queue_type: &'static str,
    pub delivery_limit: i32,
    pub dead_letter_routing_key: String,
}

impl QueueSpec {
    pub fn quorum(name: impl Into<String>) -> Self {
        let name = name.into();
        let dead_letter_routing_key = format!("{}.dlq", name);

        Self {
            name,
            durable: true,
            queue_type: QUEUE_TYPE,
            delivery_limit: DELIVERY_LIMIT,
            dead_letter_routing_key,
        }
    }

    /// Declaration arguments. Dead letters go through the default exchange.
    pub fn arguments(&self) -> FieldTable {
        let mut arguments = FieldTable::default();
        arguments.insert(
            "x-queue-type".into(),
            AMQPValue::LongString(self.queue_type.into()),
        );
        arguments.insert(
            "x-delivery-limit".into(),
            AMQPValue::LongInt(self.delivery_limit),
        );
        arguments.insert(
            "x-dead-letter-exchange".into(),
            AMQPValue::LongString("".into()),
        );
        arguments.insert(
            "x-dead-letter-routing-key".into(),
            AMQPValue::LongString(self.dead_letter_routing_key.as_str().into()),
        );
        arguments
    }
}

/// Binds the work queue to one topic exchange under the configured routing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSpec {
    pub exchange: String,
    pub queue: String,
    pub routing_key: String,
}
