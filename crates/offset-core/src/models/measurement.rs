//! Measurement batch published once per run

/// Ordered telemetry values for one run.
///
/// Layout is `offset, adapted_temp` per device in processing order, followed
/// by the ambient temperature. The telemetry sink maps position to a fixed
/// field index, so order must not change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementBatch {
    values: Vec<f64>,
}

impl MeasurementBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the computed offset and the reported temperature of one device
    pub fn push_device(&mut self, offset: f64, adapted_temp: f64) {
        self.values.push(offset);
        self.values.push(adapted_temp);
    }

    /// Append the ambient room temperature; called once, after all devices
    pub fn push_ambient(&mut self, temperature: f64) {
        self.values.push(temperature);
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_device_values_precede_ambient() {
        let mut batch = MeasurementBatch::new();
        batch.push_device(-1.0, 21.5);
        batch.push_device(0.0, 19.0);
        batch.push_ambient(20.3);

        assert_eq!(batch.values(), &[-1.0, 21.5, 0.0, 19.0, 20.3]);
        assert_eq!(batch.len(), 5);
    }
}
