//! Process-signal integration.
//!
//! [`shutdown_on_signal`] is the glue between the operating system and the
//! machine: it waits for a termination signal and injects
//! [`MachineEvent::Shutdown`](crate::MachineEvent::Shutdown), so the
//! machine winds down through the same path as a programmatic stop.
//!
//! ## Example
//! ```rust,no_run
//! # async fn demo(machine: &meteovisor::AcquisitionMachine) -> std::io::Result<()> {
//! let handle = machine.handle();
//! tokio::spawn(meteovisor::signal::shutdown_on_signal(handle));
//! # Ok(())
//! # }
//! ```

use crate::machine::MachineHandle;

/// Waits for SIGINT, SIGTERM, or SIGQUIT (Ctrl-C only on non-Unix).
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let mut quit = signal(SignalKind::quit())?;

        tokio::select! {
            _ = interrupt.recv() => {}
            _ = terminate.recv() => {}
            _ = quit.recv() => {}
            r = tokio::signal::ctrl_c() => r?,
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Blocks until a termination signal arrives, then requests shutdown.
pub async fn shutdown_on_signal(handle: MachineHandle) -> std::io::Result<()> {
    wait_for_shutdown_signal().await?;
    handle.shutdown();
    Ok(())
}
