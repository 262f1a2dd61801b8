// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum_server::tls_rustls::RustlsConfig;
use tokio_util::sync::CancellationToken;

use loan_gateway::{
    api::router,
    blockchain::{
        signer_from_hex, signer_from_pem_file, ContractBinding, LedgerClient, RpcLedgerClient,
    },
    config::{GatewayConfig, LogFormat, OperatorKeySource},
    error::StartupError,
    gateway::LoanGateway,
    identity::IdentityResolver,
    logging,
    relay::TransactionRelay,
    state::AppState,
};

/// Grace period for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    logging::init(LogFormat::from_env());

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Loan gateway failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = GatewayConfig::from_env()?;

    let contract = ContractBinding::load(&config.contract_address_path, &config.contract_abi_path)?;
    tracing::info!(
        contract = %contract.address(),
        abi = %config.contract_abi_path.display(),
        "Loaded loan contract"
    );

    let operator = match &config.operator_key {
        OperatorKeySource::Hex(hex) => signer_from_hex(hex)?,
        OperatorKeySource::PemFile(path) => signer_from_pem_file(path)?,
    };

    let ledger = RpcLedgerClient::connect(
        &config.ledger_rpc_url,
        contract,
        &operator,
        config.receipt_poll_interval,
    )?;
    match ledger.block_number().await {
        Ok(block) => tracing::info!(rpc_url = %config.ledger_rpc_url, block, "Connected to ledger node"),
        Err(e) => tracing::warn!(
            rpc_url = %config.ledger_rpc_url,
            error = %e,
            "Ledger node not reachable yet"
        ),
    }

    let ledger: Arc<dyn LedgerClient> = Arc::new(ledger);
    let resolver = IdentityResolver::new(operator);
    tracing::info!(operator = %resolver.operator_address(), "Operator identity loaded");

    let relay = TransactionRelay::new(ledger.clone(), config.confirmation_timeout);
    let state = AppState::new(LoanGateway::new(resolver, relay), ledger);
    let app = router(state);

    let shutdown = CancellationToken::new();
    let handle: axum_server::Handle<SocketAddr> = axum_server::Handle::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));
    {
        let shutdown = shutdown.clone();
        let handle = handle.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            tracing::info!("Shutdown signal received, draining connections");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });
    }

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                tracing::debug!("rustls crypto provider already installed");
            }
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            tracing::info!("Loan gateway listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!("Loan gateway listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Loan gateway stopped");
    Ok(())
}

/// Cancel `shutdown` on Ctrl-C or SIGTERM.
async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    shutdown.cancel();
}
