//! Chart Transition Demo
//!
//! Drives a scatter series through load, enter and exit transitions on a
//! simulated 60 fps clock and prints the per-node opacity:
//! - Load: every node fades in
//! - Enter: a new node appears hidden, then fades in
//! - Exit: a removed node fades out before it is dropped
//!
//! Run with: RUST_LOG=blinc_chart_transition=debug cargo run -p blinc_chart_transition --example transition_demo

use blinc_chart_transition::elements::Scatter;
use blinc_chart_transition::prelude::*;
use blinc_chart_transition::{datum_key, Result, TimerHandle};
use tracing_subscriber::EnvFilter;

const FRAME_MS: f32 = 1000.0 / 60.0;

const ANIMATE: &str = r#"
duration = 300
easing = "ease_out_cubic"

[on_load]
duration = 400

[on_enter]
duration = 250

[on_exit]
duration = 250
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let animate = AnimateConfig::from_toml_str(ANIMATE)?;
    let series = |keys: &[&str]| {
        let data = keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let x = i as f32;
                props! { "key" => *key, "x" => x, "y" => x * x, "opacity" => 1.0 }
            })
            .collect();
        let child = ChildDescriptor::new(Scatter).with_data(data);
        TransitionProps::new(child).with_animate(animate.clone())
    };

    let timer = Timer::shared();
    let mut chart = TransitionOrchestrator::new(series(&["a", "b"]), Some(timer.clone()));
    chart.on_mount();
    run("load", &mut chart, &timer);

    chart.on_props_changed(series(&["a", "b", "c"]));
    run("enter", &mut chart, &timer);

    chart.on_props_changed(series(&["a", "c"]));
    run("exit", &mut chart, &timer);

    chart.on_unmount();
    Ok(())
}

fn run(label: &str, chart: &mut TransitionOrchestrator, timer: &TimerHandle) {
    println!("-- {label}");
    let mut frame_index = 0;
    while chart.is_animating() && frame_index < 600 {
        timer.borrow_mut().advance(FRAME_MS);
        let Some(child) = chart.frame() else {
            return;
        };
        if frame_index % 4 == 0 {
            println!("{:>4}  {}", frame_index, describe(&child));
        }
        frame_index += 1;
    }
    if let Some(child) = chart.frame() {
        println!("done  {}", describe(&child));
    }
}

fn describe(child: &ChildDescriptor) -> String {
    child
        .data()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(i, datum)| {
            let opacity = datum.get("opacity").and_then(AnimValue::as_number).unwrap_or(1.0);
            format!("{}={:.2}", datum_key(datum, i), opacity)
        })
        .collect::<Vec<_>>()
        .join(" ")
}
