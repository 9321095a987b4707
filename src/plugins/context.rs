//! What a host hands a stage at each point of its lifecycle.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::schema::{Schema, StructuredRecord};
use crate::core::validation::FailureCollector;
use crate::plugins::traits::Emitter;
use crate::plugins::types::RuntimeArguments;

/// Pipeline configuration time. The stage reads the input schema, records
/// failures and declares its output schema.
#[derive(Debug)]
pub struct StageConfigurer {
    input_schema: Option<Arc<Schema>>,
    output_schema: Option<Arc<Schema>>,
    failure_collector: FailureCollector,
}

impl StageConfigurer {
    pub fn new(stage: &str, input_schema: Option<Arc<Schema>>) -> Self {
        Self {
            input_schema,
            output_schema: None,
            failure_collector: FailureCollector::new(stage),
        }
    }

    pub fn input_schema(&self) -> Option<&Schema> {
        self.input_schema.as_deref()
    }

    pub fn output_schema(&self) -> Option<&Arc<Schema>> {
        self.output_schema.as_ref()
    }

    pub fn set_output_schema(&mut self, schema: Arc<Schema>) {
        self.output_schema = Some(schema);
    }

    pub fn failure_collector(&mut self) -> &mut FailureCollector {
        &mut self.failure_collector
    }

    /// Input schema and collector at once, for validators that need both.
    pub fn validation_parts(&mut self) -> (Option<&Schema>, &mut FailureCollector) {
        (self.input_schema.as_deref(), &mut self.failure_collector)
    }
}

/// Run submission time.
#[derive(Debug)]
pub struct SubmitterContext {
    input_schema: Option<Arc<Schema>>,
    arguments: RuntimeArguments,
    failure_collector: FailureCollector,
}

impl SubmitterContext {
    pub fn new(stage: &str, input_schema: Option<Arc<Schema>>, arguments: RuntimeArguments) -> Self {
        Self {
            input_schema,
            arguments,
            failure_collector: FailureCollector::new(stage),
        }
    }

    pub fn input_schema(&self) -> Option<&Schema> {
        self.input_schema.as_deref()
    }

    pub fn arguments(&self) -> &RuntimeArguments {
        &self.arguments
    }

    pub fn failure_collector(&mut self) -> &mut FailureCollector {
        &mut self.failure_collector
    }

    pub fn validation_parts(&mut self) -> (Option<&Schema>, &mut FailureCollector) {
        (self.input_schema.as_deref(), &mut self.failure_collector)
    }
}

#[derive(Debug, Clone)]
pub struct TransformContext {
    pub stage_name: String,
    pub arguments: RuntimeArguments,
    pub cancellation: CancellationToken,
}

impl TransformContext {
    pub fn new(stage_name: impl Into<String>, arguments: RuntimeArguments) -> Self {
        Self {
            stage_name: stage_name.into(),
            arguments,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// Buffers emitted records in order.
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    records: Vec<StructuredRecord>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[StructuredRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, StructuredRecord> {
        self.records.drain(..)
    }

    pub fn into_records(self) -> Vec<StructuredRecord> {
        self.records
    }
}

impl Emitter for CollectingEmitter {
    fn emit(&mut self, record: StructuredRecord) {
        self.records.push(record);
    }
}
