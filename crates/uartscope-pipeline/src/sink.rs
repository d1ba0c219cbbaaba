//! Consumers of decoded samples.
//!
//! The poll loop feeds two sinks: a [`SampleSink`] for plotting, which only
//! sees rate-limited samples, and a [`PersistenceSink`], which sees every
//! decoded sample.

use std::collections::VecDeque;

use uartscope_frame::{Channel, Sample, CHANNEL_COUNT};

/// Points kept per channel by default.
pub const DEFAULT_PLOT_CAPACITY: usize = 6700;

/// Receives plot points, one per channel per forwarded sample.
pub trait SampleSink {
    fn add_point(&mut self, channel: Channel, elapsed_key: f64, value: i32);

    /// Feed a whole sample. The default splits it into six points.
    fn add_sample(&mut self, sample: &Sample) {
        for channel in Channel::ALL {
            self.add_point(channel, sample.elapsed(), sample.value(channel));
        }
    }

    /// Points currently held, across all channels.
    fn point_count(&self) -> usize {
        0
    }
}

/// Receives every decoded sample for logging.
pub trait PersistenceSink {
    fn record(&mut self, sample: &Sample) -> std::io::Result<()>;

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<T: SampleSink + ?Sized> SampleSink for Box<T> {
    fn add_point(&mut self, channel: Channel, elapsed_key: f64, value: i32) {
        (**self).add_point(channel, elapsed_key, value)
    }

    fn add_sample(&mut self, sample: &Sample) {
        (**self).add_sample(sample)
    }

    fn point_count(&self) -> usize {
        (**self).point_count()
    }
}

impl<T: PersistenceSink + ?Sized> PersistenceSink for Box<T> {
    fn record(&mut self, sample: &Sample) -> std::io::Result<()> {
        (**self).record(sample)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        (**self).flush()
    }
}

/// Keeps every sample in memory.
impl PersistenceSink for Vec<Sample> {
    fn record(&mut self, sample: &Sample) -> std::io::Result<()> {
        self.push(sample.clone());
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SampleSink for NullSink {
    fn add_point(&mut self, _channel: Channel, _elapsed_key: f64, _value: i32) {}
}

impl PersistenceSink for NullSink {
    fn record(&mut self, _sample: &Sample) -> std::io::Result<()> {
        Ok(())
    }
}

/// One channel's plotted history.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    points: VecDeque<(f64, i32)>,
    visible: bool,
}

impl PlotSeries {
    fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(1024)),
            visible: true,
        }
    }

    /// `(elapsed_key, value)` pairs, oldest first.
    pub fn points(&self) -> impl Iterator<Item = (f64, i32)> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<(f64, i32)> {
        self.points.back().copied()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Bounded in-memory plot buffer with six independent series.
///
/// Each series drops its oldest point once `capacity` is reached. Hidden
/// series keep collecting points; visibility only affects
/// [`PlotBuffer::value_range`].
#[derive(Debug, Clone)]
pub struct PlotBuffer {
    series: [PlotSeries; CHANNEL_COUNT],
    capacity: usize,
}

impl PlotBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            series: std::array::from_fn(|_| PlotSeries::new(capacity)),
            capacity,
        }
    }

    pub fn series(&self, channel: Channel) -> &PlotSeries {
        &self.series[channel.index()]
    }

    pub fn set_visible(&mut self, channel: Channel, visible: bool) {
        self.series[channel.index()].visible = visible;
    }

    pub fn is_visible(&self, channel: Channel) -> bool {
        self.series[channel.index()].visible
    }

    pub fn visible_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|&c| self.is_visible(c))
            .collect()
    }

    /// Smallest and largest value over visible series, for axis scaling.
    pub fn value_range(&self) -> Option<(i32, i32)> {
        self.visible_channels()
            .into_iter()
            .flat_map(|c| self.series(c).points())
            .map(|(_, v)| v)
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Oldest and newest key held by any series.
    pub fn key_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.front().into_iter().chain(s.points.back()))
            .map(|&(k, _)| k)
            .fold(None, |range, k| match range {
                None => Some((k, k)),
                Some((lo, hi)) => Some((lo.min(k), hi.max(k))),
            })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        for series in &mut self.series {
            series.points.clear();
        }
    }
}

impl Default for PlotBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_PLOT_CAPACITY)
    }
}

impl SampleSink for PlotBuffer {
    fn add_point(&mut self, channel: Channel, elapsed_key: f64, value: i32) {
        if self.capacity == 0 {
            return;
        }
        let series = &mut self.series[channel.index()];
        if series.points.len() == self.capacity {
            series.points.pop_front();
        }
        series.points.push_back((elapsed_key, value));
    }

    fn point_count(&self) -> usize {
        self.series.iter().map(PlotSeries::len).sum()
    }
}
