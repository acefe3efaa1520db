//! Command Logic Task, §4.8. Period 100 ms. Sole writer of mode, status,
//! fault bits, and (in manual) actuator commands. Arbitrates the command
//! queue and the three fault events into the state-machine transitions of
//! §4.8's table. Grounded on
//! `original_source/src/embedded/tasks/local_interface.py` for the
//! command vocabulary and on `original_source/src/embedded/tasks/fault_monitoring.py`
//! only insofar as it confirms Command Logic, not Fault Monitoring, owns
//! the fault bits (§9's Open Question resolution).

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::Receiver;
use log::{error, info};

use crate::error::CommandError;
use crate::truck_core::command::{Command, CommandSource, CommandType};
use crate::truck_core::events::{EventChannel, EventType};
use crate::truck_core::state::{Mode, SharedState, Status};

use super::run_periodic;

pub struct CommandLogicTask {
    state: Arc<SharedState>,
    events: Arc<EventChannel>,
    commands: Receiver<Command>,
    temperature_threshold: f64,
}

impl CommandLogicTask {
    pub fn new(
        state: Arc<SharedState>,
        events: Arc<EventChannel>,
        commands: Receiver<Command>,
        temperature_threshold: f64,
    ) -> Self {
        Self {
            state,
            events,
            commands,
            temperature_threshold,
        }
    }

    fn enter_fault(&self, kind: &str) {
        self.state.update_actuators(0.0, 0.0);
        self.state.set_setpoints(Some(0.0), Some(0.0));
        self.state.set_status(Status::Fault);
        info!("command-logic: entering FAULT ({kind})");
    }

    fn handle_fault_events(&self) {
        if self.events.check(EventType::TemperatureFault).is_some() {
            self.enter_fault("temperature");
        }
        if self.events.check(EventType::ElectricalFault).is_some() {
            self.state.set_faults(Some(true), None, None);
            self.enter_fault("electrical");
        }
        if self.events.check(EventType::HydraulicFault).is_some() {
            self.state.set_faults(None, Some(true), None);
            self.enter_fault("hydraulic");
        }
    }

    /// Applies one command to shared state, following §4.8's transition
    /// table. Returns the rejection reason, if any; state is left
    /// unchanged on rejection.
    pub fn apply_command(&self, cmd: Command) -> Result<(), CommandError> {
        let snap = self.state.snapshot();

        if cmd.source == CommandSource::Remote
            && matches!(snap.status, Status::Fault | Status::Emergency)
            && !matches!(cmd.command_type, CommandType::ResetFault | CommandType::ResetEmergency)
        {
            return Err(CommandError::RemoteWhileFaulted(snap.status));
        }

        match cmd.command_type {
            CommandType::EmergencyStop => {
                self.state.set_faults(None, None, Some(true));
                self.state.update_actuators(0.0, 0.0);
                self.state.set_setpoints(Some(0.0), Some(0.0));
                self.events.emit(EventType::EmergencyStop, None);
                Ok(())
            }
            CommandType::ResetEmergency => {
                if !matches!(snap.status, Status::Emergency) {
                    return Ok(());
                }
                self.state.set_faults(None, None, Some(false));
                self.state.set_mode(Mode::ManualLocal);
                self.events.emit(EventType::EmergencyReset, None);
                Ok(())
            }
            CommandType::ResetFault => {
                if !matches!(snap.status, Status::Fault) {
                    return Ok(());
                }
                self.state.set_faults(Some(false), Some(false), None);
                self.state.set_status(Status::Stopped);
                self.state.set_mode(Mode::ManualLocal);
                self.events.emit(EventType::FaultCleared, None);
                Ok(())
            }
            CommandType::EnableAutomatic => {
                if snap.mode != Mode::ManualLocal {
                    return Ok(());
                }
                if snap.has_fault(self.temperature_threshold) {
                    return Err(CommandError::FaultActive);
                }
                self.state.set_mode(Mode::AutomaticRemote);
                self.state.set_status(Status::Running);
                self.events.emit(EventType::ModeChanged, None);
                Ok(())
            }
            CommandType::DisableAutomatic => {
                if snap.mode != Mode::AutomaticRemote {
                    return Ok(());
                }
                self.state.set_mode(Mode::ManualLocal);
                self.events.emit(EventType::ModeChanged, None);
                Ok(())
            }
            CommandType::Accelerate | CommandType::MoveForward => {
                self.manual_actuator_adjust(&snap, cmd, true, cmd.value.unwrap_or(0.5))
            }
            CommandType::Brake | CommandType::MoveBackward => {
                self.manual_actuator_adjust(&snap, cmd, true, cmd.value.unwrap_or(-0.5))
            }
            CommandType::SteerLeft | CommandType::TurnLeft => {
                self.manual_actuator_adjust(&snap, cmd, false, cmd.value.unwrap_or(0.5))
            }
            CommandType::SteerRight | CommandType::TurnRight => {
                self.manual_actuator_adjust(&snap, cmd, false, cmd.value.unwrap_or(-0.5))
            }
            CommandType::Stop => {
                if snap.mode != Mode::ManualLocal || snap.has_fault(self.temperature_threshold) {
                    return Ok(());
                }
                self.state.update_actuators(0.0, 0.0);
                Ok(())
            }
        }
    }

    fn manual_actuator_adjust(
        &self,
        snap: &crate::truck_core::state::VehicleState,
        _cmd: Command,
        acceleration_channel: bool,
        value: f64,
    ) -> Result<(), CommandError> {
        if snap.mode != Mode::ManualLocal || snap.has_fault(self.temperature_threshold) {
            return Ok(());
        }
        let value = value.clamp(-1.0, 1.0);
        if acceleration_channel {
            self.state.update_actuators(value, snap.steering_cmd);
        } else {
            self.state.update_actuators(snap.acceleration_cmd, value);
        }
        Ok(())
    }

    fn tick(&self) {
        self.handle_fault_events();
        while let Ok(cmd) = self.commands.try_recv() {
            if let Err(e) = self.apply_command(cmd) {
                error!("command-logic: rejected {:?} from {:?}: {e}", cmd.command_type, cmd.source);
            }
        }
    }

    pub fn run(self, stop: &AtomicBool, period: Duration) {
        run_periodic("command-logic", period, stop, || self.tick());
    }
}
