use plotly::{
    common::Mode,
    layout::{Axis, AxisType},
    Layout, Plot, Scatter,
};

use crate::{Nanos, Record};

const MAX_DISPLAY_DATA_POINTS: usize = 4096;

/// Sequence number vs latency, keeping the slowest access of each chunk once
/// there are more than [`MAX_DISPLAY_DATA_POINTS`] records.
pub fn reduce(records: &[Record]) -> (Vec<usize>, Vec<Nanos>) {
    let chunk_size = records.len().div_ceil(MAX_DISPLAY_DATA_POINTS).max(1);
    let mut x = vec![];
    let mut y = vec![];
    for (i, chunk) in records.chunks(chunk_size).enumerate() {
        let Some((pos, slowest)) = chunk.iter().enumerate().max_by_key(|(_, r)| r.duration)
        else {
            continue;
        };
        x.push(i * chunk_size + pos);
        y.push(slowest.duration);
    }
    (x, y)
}

pub fn scatter_plot(records: &[Record]) -> Plot {
    let (x, y) = reduce(records);
    let trace = Scatter::new(x, y).mode(Mode::Markers).name("access");
    let mut plot = Plot::new();
    plot.add_trace(trace);
    let layout = Layout::default()
        .title("Memory Access Latency")
        .x_axis(Axis::default().title("Data Index"))
        .y_axis(
            Axis::default()
                .title("Access Time (Nanoseconds)")
                .type_(AxisType::Log),
        );
    plot.set_layout(layout);
    plot
}

/// Standalone HTML page.
pub fn scatter_chart_html(records: &[Record]) -> String {
    scatter_plot(records).to_html()
}
