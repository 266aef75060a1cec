//! Vector drawing of chart elements.

use crate::page::PageContext;
use monthly_report_document::text::measure_text;
use monthly_report_document::{BarChart, Chart, ChartStyle, Color, FontFace, ScatterChart, Stroke};

const AXIS_GUTTER: f32 = 46.0;
const LABEL_GAP: f32 = 4.0;

/// The box a chart was laid out into, in top-down coordinates.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChartBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub(crate) fn draw_chart(ctx: &mut PageContext, chart: &Chart, area: ChartBox, style: &ChartStyle) {
    let plot_top = draw_title(ctx, chart.title(), area, style);
    match chart {
        Chart::Scatter(scatter) => draw_scatter(ctx, scatter, area, plot_top, style),
        Chart::Bar(bar) => draw_bar(ctx, bar, area, plot_top, style),
    }
}

/// Returns the y where the plot may start.
fn draw_title(ctx: &mut PageContext, title: &str, area: ChartBox, style: &ChartStyle) -> f32 {
    let width = measure_text(title, FontFace::Bold, style.title_size);
    let x = area.x + (area.width - width).max(0.0) / 2.0;
    ctx.text(
        title,
        FontFace::Bold,
        style.title_size,
        style.axis_color,
        x,
        area.y + style.title_size,
    );
    area.y + style.title_size * 2.0
}

fn label(ctx: &mut PageContext, text: &str, style: &ChartStyle, x: f32, baseline: f32) {
    ctx.text(text, FontFace::Regular, style.label_size, style.axis_color, x, baseline);
}

fn centered_label(
    ctx: &mut PageContext,
    text: &str,
    style: &ChartStyle,
    center_x: f32,
    baseline: f32,
) {
    let width = measure_text(text, FontFace::Regular, style.label_size);
    label(ctx, text, style, center_x - width / 2.0, baseline);
}

fn right_aligned_label(
    ctx: &mut PageContext,
    text: &str,
    style: &ChartStyle,
    right_x: f32,
    baseline: f32,
) {
    let width = measure_text(text, FontFace::Regular, style.label_size);
    label(ctx, text, style, right_x - width, baseline);
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

fn draw_scatter(
    ctx: &mut PageContext,
    chart: &ScatterChart,
    area: ChartBox,
    plot_top: f32,
    style: &ChartStyle,
) {
    let bottom_gutter = style.label_size * 3.5;
    let side = (area.width - 2.0 * AXIS_GUTTER)
        .min(area.y + area.height - plot_top - bottom_gutter)
        .max(10.0);
    let left = area.x + (area.width - side) / 2.0;
    let top = plot_top;
    let bottom = top + side;
    let span = (chart.max - chart.min) as f32;
    let to_x = |v: f64| left + (v - chart.min) as f32 / span * side;
    let to_y = |v: f64| bottom - (v - chart.min) as f32 / span * side;

    let grid = Stroke {
        color: style.grid_color,
        width: 0.5,
    };
    for tick in chart.ticks() {
        let (x, y) = (to_x(tick), to_y(tick));
        ctx.line(x, top, x, bottom, grid);
        ctx.line(left, y, left + side, y, grid);
        let text = format_tick(tick);
        centered_label(ctx, &text, style, x, bottom + style.label_size + LABEL_GAP);
        right_aligned_label(ctx, &text, style, left - LABEL_GAP, y + style.label_size / 3.0);
    }
    ctx.rect(
        left,
        top,
        side,
        side,
        None,
        Some(Stroke {
            color: style.axis_color,
            width: 1.0,
        }),
    );

    centered_label(ctx, &chart.x_label, style, left + side / 2.0, bottom + style.label_size * 3.0);
    let y_label_width = measure_text(&chart.y_label, FontFace::Regular, style.label_size);
    ctx.vertical_text(
        &chart.y_label,
        FontFace::Regular,
        style.label_size,
        style.axis_color,
        left - AXIS_GUTTER / 2.0 - LABEL_GAP,
        top + side / 2.0 + y_label_width / 2.0,
    );

    let outline = Stroke {
        color: Color::WHITE,
        width: 0.75,
    };
    for point in &chart.points {
        let (x, y) = (to_x(point.x), to_y(point.y));
        ctx.circle(x, y, style.point_radius, point.color, Some(outline));
        label(
            ctx,
            &point.label,
            style,
            x + style.point_radius + 2.0,
            y - style.point_radius,
        );
    }
}

fn draw_bar(
    ctx: &mut PageContext,
    chart: &BarChart,
    area: ChartBox,
    plot_top: f32,
    style: &ChartStyle,
) {
    let legend_height = style.label_size * 2.0;
    let left = area.x + AXIS_GUTTER;
    let right = area.x + area.width - LABEL_GAP;
    let top = plot_top + legend_height;
    let bottom = area.y + area.height - style.label_size * 2.5;
    let plot_height = (bottom - top).max(10.0);
    let axis_max = chart.axis_max();
    let to_y = |v: f64| bottom - (v / axis_max) as f32 * plot_height;

    draw_legend(ctx, chart, style, right, plot_top + style.label_size);

    let grid = Stroke {
        color: style.grid_color,
        width: 0.5,
    };
    for tick in chart.ticks() {
        let y = to_y(tick);
        ctx.line(left, y, right, y, grid);
        right_aligned_label(
            ctx,
            &format_tick(tick),
            style,
            left - LABEL_GAP,
            y + style.label_size / 3.0,
        );
    }
    ctx.vertical_text(
        &chart.y_label,
        FontFace::Regular,
        style.label_size,
        style.axis_color,
        area.x + style.label_size,
        top + plot_height / 2.0
            + measure_text(&chart.y_label, FontFace::Regular, style.label_size) / 2.0,
    );

    let group_width = (right - left) / chart.categories.len() as f32;
    let bar_width = group_width * 0.7 / chart.series.len() as f32;
    for (index, category) in chart.categories.iter().enumerate() {
        let group_left = left + group_width * index as f32 + group_width * 0.15;
        for (series_index, series) in chart.series.iter().enumerate() {
            let value = series.values[index];
            let y = to_y(value);
            let x = group_left + bar_width * series_index as f32;
            ctx.rect(x, y, bar_width, bottom - y, Some(series.color), None);
        }
        centered_label(
            ctx,
            category,
            style,
            left + group_width * (index as f32 + 0.5),
            bottom + style.label_size + LABEL_GAP,
        );
    }

    let axis = Stroke {
        color: style.axis_color,
        width: 1.0,
    };
    ctx.line(left, top, left, bottom, axis);
    ctx.line(left, bottom, right, bottom, axis);
}

fn draw_legend(
    ctx: &mut PageContext,
    chart: &BarChart,
    style: &ChartStyle,
    right: f32,
    baseline: f32,
) {
    let swatch = style.label_size;
    let mut x = right;
    for series in chart.series.iter().rev() {
        let width = measure_text(&series.name, FontFace::Regular, style.label_size);
        x -= width;
        label(ctx, &series.name, style, x, baseline);
        x -= swatch + LABEL_GAP;
        ctx.rect(x, baseline - swatch * 0.85, swatch, swatch, Some(series.color), None);
        x -= 2.0 * swatch;
    }
}
