use super::types::{MeasureKind, RawSample};
use super::HistoryWarning;

/// Raw streams routed to their named series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedSeries {
    pub fill_level: Vec<RawSample>,
    pub battery_level: Vec<RawSample>,
    pub warnings: Vec<HistoryWarning>,
}

impl TaggedSeries {
    pub fn series(&self, kind: MeasureKind) -> &[RawSample] {
        match kind {
            MeasureKind::FillLevel => &self.fill_level,
            MeasureKind::BatteryLevel => &self.battery_level,
        }
    }

    fn slot_mut(&mut self, kind: MeasureKind) -> &mut Vec<RawSample> {
        match kind {
            MeasureKind::FillLevel => &mut self.fill_level,
            MeasureKind::BatteryLevel => &mut self.battery_level,
        }
    }
}

/// Route each stream by the kind of its first sample.
///
/// Streams are taken as homogeneous; later samples are not checked. When two
/// streams claim the same kind the later one replaces the earlier one and a
/// `DuplicateKind` warning is recorded.
pub fn tag_streams<I>(streams: I) -> TaggedSeries
where
    I: IntoIterator<Item = Vec<RawSample>>,
{
    let mut tagged = TaggedSeries::default();
    let mut claimed: Vec<(MeasureKind, usize)> = Vec::new();

    for (stream_index, stream) in streams.into_iter().enumerate() {
        let Some(kind) = stream.first().map(|sample| sample.kind) else {
            continue;
        };

        let previous = claimed
            .iter()
            .rev()
            .find(|(claimed_kind, _)| *claimed_kind == kind)
            .map(|(_, index)| *index);
        if let Some(replaced_stream) = previous {
            tracing::warn!(
                kind = %kind,
                replaced_stream,
                stream = stream_index,
                "two history streams report the same measure type; keeping the later one"
            );
            tagged.warnings.push(HistoryWarning::DuplicateKind {
                kind,
                replaced_stream,
                stream: stream_index,
            });
        }
        claimed.push((kind, stream_index));
        *tagged.slot_mut(kind) = stream;
    }

    tagged
}
