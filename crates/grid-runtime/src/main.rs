//! # Grid-Bridge Runtime
//!
//! Starts the runtime, initializes one demo grid, performs one fetch for it
//! and keeps serving until Ctrl+C.

use anyhow::{Context, Result};
use gc_01_grid_options::{ColumnDefinition, Pinned};
use gc_02_data_channel::{FnProducer, ProducerError};
use gc_03_grid_component::{GridComponent, GridLifecycleApi};
use grid_runtime::{GridRuntime, RuntimeConfig};
use grid_telemetry::{init_logging, log_listener_event};
use grid_types::{ComponentRef, DataRequest, ProducerIdentity};
use serde_json::{json, Value};
use tracing::info;

const DEMO_ROWS: u64 = 250;

/// Rows `startRow..endRow` of a synthetic order table.
fn demo_orders(request: &DataRequest) -> Result<Option<Value>, ProducerError> {
    let start = request.field("startRow").and_then(Value::as_u64).unwrap_or(0);
    let end = request
        .field("endRow")
        .and_then(Value::as_u64)
        .unwrap_or(DEMO_ROWS)
        .min(DEMO_ROWS);
    if start > end {
        return Err(ProducerError::InvalidRequest(format!(
            "startRow {start} is past endRow {end}"
        )));
    }

    let rows: Vec<Value> = (start..end)
        .map(|id| {
            json!({
                "id": id,
                "customer": format!("customer-{}", id % 17),
                "total": (id * 37) % 1000,
                "status": if id % 3 == 0 { "shipped" } else { "pending" },
            })
        })
        .collect();
    Ok(Some(Value::Array(rows)))
}

fn demo_grid(producer: ProducerIdentity) -> Result<GridComponent> {
    let mut grid = GridComponent::new().with_producer(producer);
    let options = grid.options_mut();

    options
        .configure_slot("rendering", |node| {
            node.set_bool("animateRows", true)
                .set_int("cellFlashDuration", 500);
        })
        .configure_slot("pagination", |node| {
            node.set_bool("pagination", true)
                .set_int("paginationPageSize", 50);
        })
        .set_top_level("rowModelType", "clientSide");

    options
        .add_column(
            ColumnDefinition::builder()
                .field("id")
                .header_name("Order")
                .pinned(Pinned::Left)
                .width(90)
                .build()?,
        )
        .add_group(vec![
            ColumnDefinition::leaf("customer"),
            ColumnDefinition::builder()
                .field("total")
                .header_component(ComponentRef::new("CurrencyHeader")?)
                .build()?,
        ])?
        .add_column(
            ColumnDefinition::builder()
                .field("status")
                .cell_renderer(ComponentRef::new("StatusBadge")?)
                .build()?,
        );

    Ok(grid)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    init_logging(&config.telemetry).context("Failed to initialize logging")?;

    let runtime = GridRuntime::new(config).context("Failed to create grid runtime")?;

    let producer = ProducerIdentity::new("demo-orders")?;
    runtime
        .producers()
        .register(producer.clone(), FnProducer::new(demo_orders));

    runtime.start().context("Failed to start grid runtime")?;

    let grid = demo_grid(producer)?;
    let init = runtime
        .controller()
        .initialize(&grid)
        .context("Failed to initialize demo grid")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&init.to_client_document())?
    );

    let request = DataRequest::new(init.listener_id.clone())
        .with_field("startRow", 0)
        .with_field("endRow", 3);
    let response = runtime
        .client()
        .fetch(request)
        .await
        .context("Demo fetch failed")?;
    log_listener_event!(info, "Demo fetch answered", init.listener_id);
    println!("{}", serde_json::to_string_pretty(&response.keyed())?);

    info!("Grid runtime is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.controller().teardown(&grid);
    runtime.shutdown().await;

    Ok(())
}
