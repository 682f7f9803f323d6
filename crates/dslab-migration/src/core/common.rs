use serde::Serialize;

/// Migration chosen by a strategy: move `vm` from `source` to `destination`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub vm: usize,
    pub source: usize,
    pub destination: usize,
}

/// Migration performed by the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MigrationEvent {
    /// Sequence number of the migration, starts from 1.
    pub seq: u64,
    pub step: u64,
    pub vm: usize,
    pub source: usize,
    pub destination: usize,
}

impl MigrationEvent {
    /// Returns zero-padded log record of the event.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            format!("{:04}", self.seq),
            format!("{:04}", self.step),
            format!("{:02}", self.vm),
            format!("{:02}", self.source),
            format!("{:02}", self.destination),
        ]
    }
}

/// Returns the index of the first minimal value among the candidates which are not `None`.
pub fn argmin<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<usize> {
    let mut result: Option<(usize, f64)> = None;
    for (i, value) in values.into_iter().enumerate() {
        if let Some(v) = value {
            if v.is_nan() {
                continue;
            }
            if result.map_or(true, |(_, best)| v < best) {
                result = Some((i, v));
            }
        }
    }
    result.map(|(i, _)| i)
}

/// Returns the index of the first maximal value among the candidates which are not `None`.
pub fn argmax<I: IntoIterator<Item = Option<f64>>>(values: I) -> Option<usize> {
    argmin(values.into_iter().map(|v| v.map(|v| -v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_record() {
        let event = MigrationEvent {
            seq: 7,
            step: 42,
            vm: 3,
            source: 0,
            destination: 12,
        };
        assert_eq!(event.to_record(), vec!["0007", "0042", "03", "00", "12"]);
    }

    #[test]
    fn arg_extremes() {
        assert_eq!(argmin(vec![Some(3.), None, Some(1.), Some(1.)]), Some(2));
        assert_eq!(argmax(vec![Some(3.), Some(3.), None]), Some(0));
        assert_eq!(argmin(vec![None, Some(f64::NAN)]), None);
        assert_eq!(argmax(Vec::<Option<f64>>::new()), None);
    }
}
