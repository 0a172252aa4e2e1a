//! BC127 (Melody) driver.
//!
//! Plain-text commands (`NAME arg arg`) answered by `OK`, `ERROR` or a
//! command-specific token. Binary payloads go out in two steps: the command
//! announces the length and the board answers `PENDING`, then the payload
//! follows as bare hex digits.
//!
//! The firmware has no session concept, see [`sessions`].

pub mod sessions;

use super::{BoardCore, BoardModel};
use crate::capability::*;
use crate::config::MelodyConfig;
use crate::protocol::{address, args, round_trip, CommandResult, StatusRule};
use crate::transport::{pattern, Groups};
use sessions::{VirtualSessions, NO_LINK};
use std::time::Duration;
use tracing::{debug, info, warn};

const BLE_CONFIG: &str = r"BLE_CONFIG=(\d) (ON|OFF) (\d+) (ON|OFF)\r";
const LOCAL_ADDR: &str = r"LOCAL_ADDR=(\w{12}) (\w{12})\r";
const UART_CONFIG: &str = r"UART_CONFIG=(\d{4,6}) (ON|OFF) ([0-2])\r";
const VERSION: &str = r"([\w| ]+) Copyright \d{4}\r([\w| |\.]+)\rBuild: (\d+)";

/// Join a command and its arguments with spaces; `SET NAME=` takes its
/// value without one.
fn command_line(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_owned()
    } else if command.ends_with('=') {
        format!("{command}{}", args.join(" "))
    } else {
        format!("{command} {}", args.join(" "))
    }
}

fn hex_payload(groups: &Groups, index: usize) -> Option<Vec<u8>> {
    hex::decode(groups.get(index)?).ok()
}

#[derive(Debug)]
pub struct Melody {
    core: BoardCore,
    sessions: VirtualSessions,
    command_timeout: Duration,
    custom_command_timeout: Duration,
    raw_data_timeout: Duration,
}

impl Melody {
    pub fn new(core: BoardCore, config: &MelodyConfig) -> Self {
        Self {
            core,
            sessions: VirtualSessions::new(),
            command_timeout: config.command_timeout(),
            custom_command_timeout: config.custom_command_timeout(),
            raw_data_timeout: config.raw_data_timeout(),
        }
    }

    pub fn virtual_sessions(&self) -> &VirtualSessions {
        &self.sessions
    }

    fn execute(
        &mut self,
        command: &str,
        args: &[String],
        success: &str,
        error: &str,
        timeout: Duration,
    ) -> CommandResult {
        let rules = [
            StatusRule::success(success),
            StatusRule::error(error),
            StatusRule::error("ERROR"),
        ];
        let line = command_line(command, args);
        round_trip(self.core.transport_mut(), &line, &rules, timeout)
    }

    /// Run a command answered by `OK`.
    fn run(&mut self, command: &str, args: &[String]) -> bool {
        self.execute(command, args, "OK", "ERROR", self.command_timeout)
            .is_success()
    }

    /// Run a command that announces a payload and wait for `PENDING`.
    fn announce(&mut self, command: &str, args: &[String]) -> bool {
        self.execute(command, args, "PENDING", "ERROR", self.command_timeout)
            .is_success()
    }

    /// Write `data` as lower-case hex digits, without terminator.
    fn send_raw(&mut self, data: &[u8]) -> bool {
        let transport = self.core.transport_mut();
        match transport.write_str(&hex::encode(data)) {
            Ok(()) => true,
            Err(e) => {
                warn!(port = %transport.name(), error = %e, "raw data write failed");
                false
            }
        }
    }

    /// Announce and send a payload.
    fn transfer(&mut self, command: &str, args: &[String], data: &[u8]) -> bool {
        self.announce(command, args) && self.send_raw(data)
    }

    /// Load advertising or scan response data and wait for it to be taken.
    fn load_data(&mut self, command: &str, data: &[u8]) -> bool {
        self.transfer(command, &args![data.len()], data)
            && self
                .core
                .transport()
                .line_starts_with("OK", self.raw_data_timeout)
                .is_some()
    }

    fn set_config(&mut self, name: &str, value: String) -> bool {
        self.run(&format!("SET {name}="), &[value])
    }

    fn get_config(&mut self, name: &str, re: &regex::Regex) -> Option<Groups> {
        if !self.run(&format!("GET {name}"), &[]) {
            return None;
        }
        self.core.transport().search_first(re, Duration::ZERO)
    }

    /// The board answers `ERROR 0x0012` once its command buffer is empty.
    fn clear_command_buffer(&mut self) -> bool {
        let result = self.execute("<clear>", &[], "OK", "ERROR 0x0012", self.command_timeout);
        result == CommandResult::Error
    }

    fn version(&mut self) -> Option<Groups> {
        if !self.run("VERSION", &[]) {
            return None;
        }
        self.core
            .transport()
            .search_first(pattern!(VERSION), Duration::ZERO)
    }

    /// Link id of a connected session.
    fn connected_link(&self, session_id: u32) -> Option<u32> {
        self.sessions.link(session_id).filter(|link| *link != NO_LINK)
    }

    /// First `<EVENT> <link> <handle> <len> <hex>` payload for the session
    /// and handle.
    fn gatt_event(
        &self,
        re: &regex::Regex,
        session_id: u32,
        handle: u16,
        timeout: Duration,
    ) -> Option<Vec<u8>> {
        let link = self.connected_link(session_id)?;
        let groups = self.core.transport().search_first_where(re, timeout, |g| {
            g.parse_hex(0) == Some(link) && g.parse_hex(1) == Some(u32::from(handle))
        })?;
        hex_payload(&groups, 3)
    }

    fn gatt_transfer(&mut self, command: &str, session_id: u32, handle: u16, value: &[u8]) -> bool {
        let Some(link) = self.connected_link(session_id) else {
            warn!(board = %self.model(), session_id, "session not connected");
            return false;
        };
        let args = args![
            format!("{link:X}"),
            format!("{handle:X}"),
            format!("{:X}", value.len())
        ];
        self.transfer(command, &args, value)
    }

    /// Bytes of every `RECV` event on the session's link, `None` when there
    /// was none.
    fn received_data(&self, session_id: u32, timeout: Duration) -> Option<Vec<u8>> {
        let link = self.connected_link(session_id)?;
        let events: Vec<Groups> = self
            .core
            .transport()
            .search_all(pattern!(r"RECV ([0-9A-F]+) (\d+) (.+?)\r"), timeout)
            .into_iter()
            .filter(|g| g.parse_hex(0) == Some(link))
            .collect();
        if events.is_empty() {
            return None;
        }
        // one char per received byte
        Some(
            events
                .iter()
                .filter_map(|g| g.get(2))
                .flat_map(|text| text.chars().map(|c| c as u8))
                .collect(),
        )
    }

    fn send_data(&mut self, session_id: u32, data: &[u8]) -> bool {
        let Some(link) = self.connected_link(session_id) else {
            return false;
        };
        // notification when enabled, write request to the BC Smart data
        // characteristic otherwise
        self.transfer(
            "SEND_RAW",
            &args![format!("{link:X}"), format!("{:X}", data.len())],
            data,
        )
    }
}

impl BoardHandle for Melody {
    fn core(&self) -> &BoardCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BoardCore {
        &mut self.core
    }

    fn model(&self) -> BoardModel {
        BoardModel::Melody
    }
}

impl CommonApi for Melody {
    fn send_custom_command(&mut self, command: &str) -> bool {
        self.execute(command, &[], "OK", "ERROR", self.custom_command_timeout)
            .is_success()
    }

    fn reset(&mut self) -> bool {
        let reset = self
            .execute("RESET", &[], "Ready", "ERROR", self.command_timeout)
            .is_success();
        if reset {
            self.sessions.clear();
        }
        reset
    }

    fn supported_commands(&mut self) -> Option<Vec<String>> {
        if !self.run("HELP", &[]) {
            return None;
        }
        let mut commands: Vec<String> = self
            .core
            .transport()
            .search_all(pattern!(r"(\w+)\r"), Duration::ZERO)
            .iter()
            .filter_map(|g| g.get(0).map(str::to_owned))
            .collect();
        // trailing OK
        commands.pop();
        Some(commands)
    }

    /// Restores the factory configuration, forgets paired devices and
    /// resets.
    fn restore_defaults(&mut self) -> bool {
        if !self
            .execute("RESTORE", &[], "Ready", "ERROR", self.command_timeout)
            .is_success()
        {
            return false;
        }
        self.sessions.clear();
        self.run("UNPAIR", &[]) && self.reset()
    }

    fn manufacturer_id(&mut self) -> Option<String> {
        self.version()?.get(0).map(|s| s.trim().to_owned())
    }

    /// No command reports the model; this driver only talks to one.
    fn model_id(&mut self) -> Option<String> {
        Some(BoardModel::Melody.model_id().to_owned())
    }

    fn revision_id(&mut self) -> Option<String> {
        self.version()?.get(1).map(|s| s.trim().to_owned())
    }

    fn remote_controller(&mut self) -> Option<u32> {
        unsupported(self.model(), "remote_controller");
        Some(0)
    }
}

impl HwApi for Melody {
    /// The `OK` is printed at the new speed, so success is judged by the
    /// board answering afterwards.
    fn set_uart_baudrate(&mut self, baud_rate: u32) -> bool {
        let Some(uart) = self.get_config("UART_CONFIG", pattern!(UART_CONFIG)) else {
            return false;
        };
        let (Some(flow), Some(parity)) = (uart.get(1), uart.get(2)) else {
            return false;
        };
        let value = format!("{baud_rate} {flow} {parity}");
        if !self.set_config("UART_CONFIG", value) {
            // usually the OK went out at the new speed
            debug!(board = %self.model(), baud_rate, "no OK for UART_CONFIG at the old speed");
        }
        if !self.core.set_serial_baudrate(baud_rate) {
            return false;
        }
        self.clear_command_buffer()
    }

    /// Flow control changes need a save and a reboot.
    fn set_uart_flow_control(&mut self, enable: bool) -> bool {
        let Some(uart) = self.get_config("UART_CONFIG", pattern!(UART_CONFIG)) else {
            return false;
        };
        let (Some(baud), Some(parity)) = (uart.get(0), uart.get(2)) else {
            return false;
        };
        if (uart.get(1) == Some("ON")) == enable {
            debug!(board = %self.model(), enable, "flow control already set");
            return true;
        }
        let value = format!("{baud} {} {parity}", if enable { "ON" } else { "OFF" });
        self.set_config("UART_CONFIG", value)
            && self.save_settings()
            && self.reset()
            && self.core.serial_flow_control(enable)
    }

    fn uart_baudrate(&mut self) -> Option<u32> {
        self.get_config("UART_CONFIG", pattern!(UART_CONFIG))?
            .parse(0)
    }

    fn save_settings(&mut self) -> bool {
        self.run("WRITE", &[])
    }
}

impl BleApi for Melody {
    /// Private when the board advertises with a random address.
    fn local_address(&mut self) -> Option<Bdaddr> {
        let local = self.get_config("LOCAL_ADDR", pattern!(LOCAL_ADDR))?;
        let addr = address::from_compact(local.get(1)?);
        let ble = self.get_config("BLE_CONFIG", pattern!(BLE_CONFIG))?;
        let addr_type = match ble.get(3) {
            Some("ON") => AddressType::Private,
            _ => AddressType::Public,
        };
        Bdaddr::new(&addr, addr_type).ok()
    }

    fn create_session(&mut self, bdaddr: &Bdaddr) -> Option<BleSession> {
        self.sessions.create(bdaddr)
    }

    fn delete_session(&mut self, session_id: u32) -> bool {
        self.sessions.delete(session_id)
    }

    fn session_id_for(&mut self, bdaddr: &Bdaddr) -> Option<u32> {
        self.sessions.session_for(bdaddr)
    }

    fn sessions(&mut self) -> Option<Vec<BleSession>> {
        Some(self.sessions.sessions())
    }
}

impl GapApi for Melody {
    fn set_advertising_enable(
        &mut self,
        enable: bool,
        adv_data: Option<&[u8]>,
        scan_resp_data: Option<&[u8]>,
    ) -> bool {
        if let Some(data) = adv_data.filter(|d| !d.is_empty()) {
            if !self.load_data("ADVERTISING", data) {
                return false;
            }
        }
        if let Some(data) = scan_resp_data.filter(|d| !d.is_empty()) {
            if !self.load_data("SSRD", data) {
                return false;
            }
        }
        self.run("ADVERTISING", &args![if enable { "ON" } else { "OFF" }])
    }

    fn scan(&mut self, duration_s: u32, format: ScanResultFormat) -> Option<ScanResults> {
        let mut args = args![duration_s];
        if format == ScanResultFormat::RawData {
            args.push("ON".to_owned());
        }
        let timeout = Duration::from_secs(u64::from(duration_s) + 1);
        if !self
            .execute("SCAN", &args, "SCAN_OK", "ERROR", timeout)
            .is_success()
        {
            return None;
        }
        let transport = self.core.transport();
        let results = match format {
            ScanResultFormat::Default => {
                let re = pattern!(r"SCAN (\w{12}) (0|1) <(.*?)> ([0-9A-F]{2}) -(\d+)dBm\r");
                ScanResults::Parsed(
                    transport
                        .search_all(re, Duration::ZERO)
                        .iter()
                        .filter_map(|g| {
                            Some(ScanResult {
                                addr: address::from_compact(g.get(0)?),
                                addr_type: g.parse::<u8>(1).and_then(AddressType::from_code)?,
                                rssi: -g.parse::<i16>(4)?,
                                flag: u8::try_from(g.parse_hex(3)?).ok()?,
                                name: g.get(2).filter(|n| !n.is_empty()).map(str::to_owned),
                            })
                        })
                        .collect(),
                )
            }
            ScanResultFormat::RawData => {
                let re = pattern!(r"SCAN_RAW (\w{12}) (\d) -(\d+)dBm (\d+) ([0-9A-F| ]+)\r");
                ScanResults::Raw(
                    transport
                        .search_all(re, Duration::ZERO)
                        .iter()
                        .filter_map(|g| {
                            Some(ScanRawResult {
                                addr: address::from_compact(g.get(0)?),
                                addr_type: g.parse::<u8>(1).and_then(AddressType::from_code)?,
                                rssi: -g.parse::<i16>(2)?,
                                raw_data: g
                                    .get(4)?
                                    .split_whitespace()
                                    .map(|octet| u8::from_str_radix(octet, 16).ok())
                                    .collect::<Option<Vec<u8>>>()?,
                            })
                        })
                        .collect(),
                )
            }
        };
        Some(results)
    }

    fn connect(&mut self, session_id: u32, max_attempts: u32) -> bool {
        let Some(bdaddr) = self.sessions.bdaddr(session_id).cloned() else {
            warn!(board = %self.model(), session_id, "unknown session");
            return false;
        };
        let mut args = args![address::to_compact(bdaddr.addr()), "BLE"];
        if bdaddr.addr_type() == AddressType::Private {
            args.push("1".to_owned());
        }
        for attempt in 1..=max_attempts {
            if self.announce("OPEN", &args) && self.wait_for_connection(CONNECTION_TIMEOUT) {
                return true;
            }
            warn!(board = %self.model(), session_id, attempt, "connection attempt failed");
        }
        false
    }

    /// Link ids are two hex digits, the second one being the BLE profile.
    fn wait_for_connection(&mut self, timeout: Duration) -> bool {
        let Some(event) = self
            .core
            .transport()
            .search_first(pattern!(r"OPEN_OK (\d4) BLE (\w{12})\r"), timeout)
        else {
            return false;
        };
        let (Some(link), Some(addr)) = (event.parse_hex(0), event.get(1)) else {
            return false;
        };
        let Ok(bdaddr) = Bdaddr::new(&address::from_compact(addr), AddressType::Unknown) else {
            return false;
        };
        match self.sessions.attach_link(&bdaddr, link) {
            Some(session_id) => {
                info!(board = %self.model(), session_id, link = %format!("{link:X}"), "connected");
            }
            None => warn!(board = %self.model(), %bdaddr, "no free virtual session"),
        }
        true
    }

    fn disconnect(&mut self, session_id: u32) -> bool {
        let Some(link) = self.sessions.link(session_id) else {
            return false;
        };
        self.run("CLOSE", &args![format!("{link:X}")])
            && self.wait_for_disconnection(session_id, GATT_TIMEOUT)
    }

    fn wait_for_disconnection(&mut self, session_id: u32, timeout: Duration) -> bool {
        let Some(link) = self.sessions.link(session_id) else {
            return false;
        };
        let closed = self
            .core
            .transport()
            .search_first_where(
                pattern!(r"CLOSE_OK ([0-9A-F]+) BLE (\w{12})\r"),
                timeout,
                |g| g.parse_hex(0) == Some(link),
            )
            .is_some();
        if closed {
            self.sessions.set_link(session_id, NO_LINK);
        }
        closed
    }

    fn is_connected(&mut self, session_id: u32) -> Option<bool> {
        Some(self.connected_link(session_id).is_some())
    }
}

impl GattApi for Melody {
    fn local_mtu(&mut self) -> Option<u16> {
        self.get_config("BLE_CONFIG", pattern!(BLE_CONFIG))?.parse(2)
    }

    fn exchanged_mtu(&mut self, session_id: u32) -> Option<u16> {
        let link = self.connected_link(session_id)?;
        if !self.run("STATUS", &[]) {
            return None;
        }
        self.core
            .transport()
            .search_first_where(
                pattern!(r"LINK ([0-9A-F]+) CONNECTED BLE (\w{12}) ([0-9]{2,3})\r"),
                Duration::ZERO,
                |g| g.parse_hex(0) == Some(link),
            )?
            .parse(2)
    }

    fn discover_primary_services(&mut self, session_id: u32) -> Option<Vec<GattService>> {
        let link = self.connected_link(session_id)?;
        if !self.run("BLE_GET_SERV", &args![format!("{link:X}")]) {
            return None;
        }
        let re =
            pattern!(r"BLE_SERV (\d4) (\w+) ([0-9A-F|\-]+) ([0-9A-F]{4}) ([0-9A-F]{4})\r");
        Some(
            self.core
                .transport()
                .search_all(re, Duration::ZERO)
                .iter()
                .filter(|g| g.parse_hex(0) == Some(link))
                .filter_map(|g| {
                    Some(GattService {
                        uuid: g.get(2)?.to_owned(),
                        is_primary: true,
                        start_handle: u16::try_from(g.parse_hex(3)?).ok()?,
                        end_handle: u16::try_from(g.parse_hex(4)?).ok()?,
                    })
                })
                .collect(),
        )
    }

    fn discover_characteristics(&mut self, session_id: u32) -> Option<Vec<GattCharacteristic>> {
        let link = self.connected_link(session_id)?;
        if !self.run("BLE_GET_CHAR", &args![format!("{link:X}")]) {
            return None;
        }
        let re =
            pattern!(r"BLE_CHAR (\d4) (\w+) ([0-9A-F|\-]+) ([0-9A-F]{4}) ([0-9A-F]{2})\r");
        Some(
            self.core
                .transport()
                .search_all(re, Duration::ZERO)
                .iter()
                .filter(|g| g.parse_hex(0) == Some(link))
                .filter_map(|g| {
                    Some(GattCharacteristic {
                        uuid: g.get(2)?.to_owned(),
                        handle: u16::try_from(g.parse_hex(3)?).ok()?,
                        properties: CharProperties(u8::try_from(g.parse_hex(4)?).ok()?),
                    })
                })
                .collect(),
        )
    }

    fn read_request(&mut self, session_id: u32, handle: u16) -> bool {
        let Some(link) = self.connected_link(session_id) else {
            return false;
        };
        self.announce("BLE_READ", &args![format!("{link:X}"), format!("{handle:04X}")])
    }

    fn wait_for_read_request(&mut self, session_id: u32, handle: u16, timeout: Duration) -> bool {
        let Some(link) = self.connected_link(session_id) else {
            return false;
        };
        self.core
            .transport()
            .search_first_where(
                pattern!(r"BLE_READ ([0-9A-F]+) ([0-9A-F]{4})\r"),
                timeout,
                |g| g.parse_hex(0) == Some(link) && g.parse_hex(1) == Some(u32::from(handle)),
            )
            .is_some()
    }

    /// The firmware cannot reject a read or answer at an offset.
    fn read_response(
        &mut self,
        session_id: u32,
        handle: u16,
        accept: bool,
        value: &[u8],
        offset: u16,
    ) -> bool {
        if !accept {
            ignored(self.model(), "accept");
        }
        if offset != 0 {
            ignored(self.model(), "offset");
        }
        self.gatt_transfer("BLE_READ_RES", session_id, handle, value)
    }

    fn wait_for_read_response(
        &mut self,
        session_id: u32,
        handle: u16,
        timeout: Duration,
    ) -> Option<Vec<u8>> {
        self.gatt_event(
            pattern!(r"BLE_READ_RES ([0-9A-F]+) ([0-9A-F]{4}) ([0-9A-F]+) ([0-9A-Fa-f]*)\r"),
            session_id,
            handle,
            timeout,
        )
    }

    fn write_request(&mut self, session_id: u32, handle: u16, value: &[u8], need_rsp: bool) -> bool {
        if !need_rsp {
            unsupported(self.model(), "write without response");
            return false;
        }
        self.gatt_transfer("BLE_WRITE", session_id, handle, value)
    }

    fn wait_for_write_request(
        &mut self,
        session_id: u32,
        handle: u16,
        timeout: Duration,
    ) -> Option<GattWriteRequest> {
        let value = self.gatt_event(
            pattern!(r"BLE_WRITE ([0-9A-F]+) ([0-9A-F]{4}) ([0-9A-F]+) ([0-9A-Fa-f]*)\r"),
            session_id,
            handle,
            timeout,
        )?;
        Some(GattWriteRequest {
            session_id,
            handle,
            offset: 0,
            value,
            need_rsp: false,
        })
    }

    fn write_response(&mut self, _session_id: u32, _handle: u16, _accept: bool) -> bool {
        warn!(board = %self.model(), "write responses are sent by the firmware");
        true
    }

    fn wait_for_write_response(
        &mut self,
        _session_id: u32,
        _handle: u16,
        timeout: Duration,
    ) -> bool {
        self.core
            .transport()
            .line_starts_with("OK", timeout)
            .is_some()
    }

    fn notification_request(&mut self, session_id: u32, handle: u16, value: &[u8]) -> bool {
        self.gatt_transfer("BLE_NOTIFICATION", session_id, handle, value)
    }

    fn wait_for_notification(
        &mut self,
        session_id: u32,
        handle: u16,
        timeout: Duration,
    ) -> Option<Vec<u8>> {
        self.gatt_event(
            pattern!(r"BLE_NOTIFICATION ([0-9A-F]+) ([0-9A-F]{4}) ([0-9A-F]+) ([0-9A-Fa-f]*)\r"),
            session_id,
            handle,
            timeout,
        )
    }

    fn indication_request(&mut self, session_id: u32, handle: u16, value: &[u8]) -> bool {
        self.gatt_transfer("BLE_INDICATION", session_id, handle, value)
    }

    fn wait_for_indication(
        &mut self,
        session_id: u32,
        handle: u16,
        timeout: Duration,
    ) -> Option<Vec<u8>> {
        self.gatt_event(
            pattern!(r"BLE_INDICATION ([0-9A-F]+) ([0-9A-F]{4}) ([0-9A-F]+) ([0-9A-Fa-f]*)\r"),
            session_id,
            handle,
            timeout,
        )
    }

    /// Confirmations are sent by the firmware.
    fn indication_response(&mut self, _session_id: u32, _handle: u16) -> bool {
        true
    }

    fn wait_for_indication_response(
        &mut self,
        _session_id: u32,
        _handle: u16,
        timeout: Duration,
    ) -> bool {
        self.core
            .transport()
            .line_starts_with("OK", timeout)
            .is_some()
    }
}

impl BcSmartApi for Melody {
    fn server_send_data(&mut self, session_id: u32, data: &[u8]) -> bool {
        self.send_data(session_id, data)
    }

    fn server_wait_for_data(&mut self, session_id: u32, timeout: Duration) -> Option<Vec<u8>> {
        self.received_data(session_id, timeout)
    }

    fn server_wait_for_command(&mut self, session_id: u32, timeout: Duration) -> Option<String> {
        let link = self.connected_link(session_id)?;
        self.core
            .transport()
            .search_first_where(
                pattern!(r"BC_SMART_CMD ([0-9A-F]+) (\d+) (\w+)\r"),
                timeout,
                |g| g.parse_hex(0) == Some(link),
            )?
            .get(2)
            .map(str::to_owned)
    }

    fn client_send_data(&mut self, session_id: u32, data: &[u8]) -> bool {
        self.send_data(session_id, data)
    }

    fn client_wait_for_data(&mut self, session_id: u32, timeout: Duration) -> Option<Vec<u8>> {
        self.received_data(session_id, timeout)
    }

    fn client_send_command(&mut self, session_id: u32, command: &str) -> bool {
        let Some(link) = self.connected_link(session_id) else {
            return false;
        };
        self.run("BC_SMART_COMMAND", &args![format!("{link:X}"), command])
    }

    fn client_wait_for_command_response(
        &mut self,
        session_id: u32,
        timeout: Duration,
    ) -> Option<Vec<String>> {
        let link = self.connected_link(session_id)?;
        let responses: Vec<String> = self
            .core
            .transport()
            .search_all(pattern!(r"BC_SMART_CMD_RESP ([0-9A-F]+) (\d+) (\w+)\r"), timeout)
            .iter()
            .filter(|g| g.parse_hex(0) == Some(link))
            .filter_map(|g| g.get(2).map(str::to_owned))
            .collect();
        (!responses.is_empty()).then_some(responses)
    }
}
