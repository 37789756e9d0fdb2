use arrow::array::{ArrayRef, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use ocean_parser::Observation;
use std::sync::Arc;

/// Column builder for observation batches served to chart clients.
pub struct ObservationBatchBuilder {
    id: Vec<u32>,
    timestamp: Vec<String>,
    dissolved_oxygen: Vec<f64>,
    salinity: Vec<f64>,
    temperature: Vec<f64>,
    pressure: Vec<f64>,
}

impl ObservationBatchBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: Vec::with_capacity(capacity),
            timestamp: Vec::with_capacity(capacity),
            dissolved_oxygen: Vec::with_capacity(capacity),
            salinity: Vec::with_capacity(capacity),
            temperature: Vec::with_capacity(capacity),
            pressure: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, observation: &Observation) {
        self.id.push(observation.id);
        self.timestamp.push(observation.timestamp.clone());
        self.dissolved_oxygen.push(observation.dissolved_oxygen);
        self.salinity.push(observation.salinity);
        self.temperature.push(observation.temperature);
        self.pressure.push(observation.pressure);
    }

    pub fn build_batch(self) -> Result<RecordBatch, ArrowError> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt32Array::from(self.id)),
            Arc::new(StringArray::from(self.timestamp)),
            Arc::new(Float64Array::from(self.dissolved_oxygen)),
            Arc::new(Float64Array::from(self.salinity)),
            Arc::new(Float64Array::from(self.temperature)),
            Arc::new(Float64Array::from(self.pressure)),
        ];

        RecordBatch::try_new(observation_schema(), columns)
    }
}

pub fn observation_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::UInt32, false),
        Field::new("timestamp", DataType::Utf8, false),
        Field::new("dissolved_oxygen", DataType::Float64, false),
        Field::new("salinity", DataType::Float64, false),
        Field::new("temperature", DataType::Float64, false),
        Field::new("pressure", DataType::Float64, false),
    ]))
}

/// Encodes observations as a single-batch Arrow IPC stream.
pub fn encode_observations(observations: &[Observation]) -> Result<Vec<u8>, ArrowError> {
    let mut builder = ObservationBatchBuilder::with_capacity(observations.len());
    for observation in observations {
        builder.push(observation);
    }
    let batch = builder.build_batch()?;

    let mut buffer = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buffer, &batch.schema())?;
        writer.write(&batch)?;
        writer.finish()?;
    }

    Ok(buffer)
}
