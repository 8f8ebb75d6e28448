//! Skycourier engine - drone fleet dispatch and flight simulation

use anyhow::Result;
use skycourier_core::{GeoPoint, OrderReady};
use skycourier_engine::{Config, Dispatcher, FleetState, TracingPublisher};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skycourier_engine=debug".parse()?),
        )
        .init();

    tracing::info!("Starting skycourier engine...");

    let config = Config::from_env();
    let params = config.step_params();
    let state = Arc::new(FleetState::new());
    let publisher = Arc::new(TracingPublisher);

    // Demo fleet at the Saigon depot. A real deployment registers drones
    // through the fleet admin service instead.
    let depot = GeoPoint::new(10.7769, 106.7009);
    for (serial, model, capacity_kg) in [
        ("SKY-001", "falcon-x", 5.0),
        ("SKY-002", "falcon-x", 5.0),
        ("SKY-003", "sparrow", 2.5),
    ] {
        state.register_drone(serial, model, capacity_kg, depot)?;
    }

    let (shutdown_tx, _) = broadcast::channel(1);
    tokio::spawn(skycourier_engine::loops::simulation_loop::run_simulation_loop(
        state.clone(),
        publisher.clone(),
        params,
        shutdown_tx.subscribe(),
    ));

    // Demo order so a bare `cargo run` shows a full mission lifecycle.
    let dispatcher = Dispatcher::new(state.clone(), publisher, config.cruise_speed_kmh);
    let order = OrderReady {
        order_id: "demo-order-1".into(),
        merchant_id: "demo-merchant".into(),
        delivery_method: "DRONE".into(),
        pickup_lat: 10.7769,
        pickup_lon: 106.7009,
        pickup_address: "demo depot".into(),
        delivery_lat: 10.8231,
        delivery_lon: 106.6297,
        delivery_address: "demo customer".into(),
        payload_kg: 1.5,
    };
    dispatcher.handle_order_ready(&order)?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    let _ = shutdown_tx.send(());

    Ok(())
}
