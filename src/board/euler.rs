//! BX310X (Euler) driver.
//!
//! Same AT framing as the BC310X, with three differences that shape this
//! driver:
//!
//! - The Bluetooth system is off after a reset and has to be switched on
//!   (`+SRBTSYSTEM=1`) before any BLE command.
//! - GATT requests are acknowledged by the firmware. There is no manual
//!   write response, and a read response must quote the transfer id of the
//!   read request it answers.
//! - Handles are assigned by the board: every local service owns a block of
//!   [`SERVICE_HANDLE_RANGE`] handles starting at [`SERVICE_HANDLE_OFFSET`].
//!   Characteristics go into the service added last; descriptors go into
//!   the service owning the characteristic added last.

use super::{at, BoardCore, BoardModel};
use crate::capability::*;
use crate::config::EulerConfig;
use crate::protocol::{
    address, args, at_command, escape, round_trip, AtForm, CommandResult, StatusRule,
};
use crate::transport::{pattern, Groups};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Handle of the first local service.
pub const SERVICE_HANDLE_OFFSET: u16 = 50;
/// Handles reserved for each local service.
pub const SERVICE_HANDLE_RANGE: u16 = 100;

/// `+SRBLECFG` reply: session, connected, address, MTU.
const SESSION_CFG: &str = r#"\+SRBLECFG: (\d+),([0|1]),"([\w|:]{17})",(\d+)"#;

#[derive(Debug)]
pub struct Euler {
    core: BoardCore,
    command_timeout: Duration,
    ready_settle: Duration,
    connection_settle: Duration,
    transfer_id_timeout: Duration,
    /// Handle of the last local service added.
    service_handle: Option<u16>,
    /// Value handle of the last local characteristic added.
    characteristic_handle: Option<u16>,
}

impl Euler {
    pub fn new(core: BoardCore, config: &EulerConfig) -> Self {
        Self {
            core,
            command_timeout: config.command_timeout(),
            ready_settle: config.ready_settle(),
            connection_settle: config.connection_settle(),
            transfer_id_timeout: config.transfer_id_timeout(),
            service_handle: None,
            characteristic_handle: None,
        }
    }

    /// Handle of the service that owns `handle`, `None` below the first service.
    pub fn service_handle_for(handle: u16) -> Option<u16> {
        let above = handle.checked_sub(SERVICE_HANDLE_OFFSET)?;
        Some(above / SERVICE_HANDLE_RANGE * SERVICE_HANDLE_RANGE + SERVICE_HANDLE_OFFSET)
    }

    fn rules(command: &str) -> [StatusRule; 3] {
        let success = match command {
            "+RST" | "&F" => "READY",
            _ => "OK",
        };
        [
            StatusRule::success(success),
            StatusRule::protocol_error("+CME ERROR"),
            StatusRule::error("ERROR"),
        ]
    }

    fn send(&mut self, command: &str, form: AtForm<'_>, timeout: Duration) -> CommandResult {
        let line = at_command(command, form);
        round_trip(
            self.core.transport_mut(),
            &line,
            &Self::rules(command),
            timeout,
        )
    }

    fn execute(&mut self, command: &str) -> bool {
        self.send(command, AtForm::Execute, self.command_timeout)
            .is_success()
    }

    fn query(&mut self, command: &str) -> bool {
        self.send(command, AtForm::Query, self.command_timeout)
            .is_success()
    }

    fn write(&mut self, command: &str, args: &[String]) -> bool {
        self.send(command, AtForm::Write(args), self.command_timeout)
            .is_success()
    }

    fn reply(&self, re: &regex::Regex) -> Option<Groups> {
        self.core.transport().search_first(re, Duration::ZERO)
    }

    fn replies(&self, re: &regex::Regex) -> Vec<Groups> {
        self.core.transport().search_all(re, Duration::ZERO)
    }

    /// Switch the Bluetooth system on unless it already is.
    fn enable_bluetooth(&mut self) -> bool {
        if !self.query("+SRBTSYSTEM") {
            return false;
        }
        if self.reply(pattern!(r"\+SRBTSYSTEM: (1)")).is_some() {
            return true;
        }
        debug!(port = %self.core.port_name(), "enabling Bluetooth system");
        self.write("+SRBTSYSTEM", &args![1])
    }

    fn forget_local_database(&mut self) {
        self.service_handle = None;
        self.characteristic_handle = None;
    }

    fn session_entry(&mut self, session_id: u32) -> Option<Groups> {
        if !self.enable_bluetooth() || !self.query("+SRBLECFG") {
            return None;
        }
        self.replies(pattern!(SESSION_CFG))
            .into_iter()
            .find(|g| g.parse::<u32>(0) == Some(session_id))
    }

    /// Whether `handle` is a characteristic value of the peer, as opposed
    /// to a descriptor. `None` when discovery fails.
    fn is_characteristic(&mut self, session_id: u32, handle: u16) -> Option<bool> {
        let characteristics = self.discover_characteristics(session_id)?;
        Some(characteristics.iter().any(|c| c.handle == handle))
    }

    /// Transfer id of the latest read request for `handle`.
    fn transfer_id(&self, session_id: u32, handle: u16) -> Option<u32> {
        self.core
            .transport()
            .search_first_where(
                pattern!(r"\+SRBLEREAD: (\d+),(\d+),(\d+)"),
                self.transfer_id_timeout,
                |g| g.parse::<u32>(0) == Some(session_id) && g.parse::<u16>(2) == Some(handle),
            )?
            .parse(1)
    }

    /// Concatenated BC Smart payloads received for `session_id` with `role`.
    fn smart_data(&self, session_id: u32, role: u8, timeout: Duration) -> Vec<u8> {
        self.core
            .transport()
            .search_all(pattern!(r#"\+SRBCSMARTRECV: (\d+),(\d+),"([^\r\n]*)"[\r\n]"#), timeout)
            .iter()
            .filter(|g| g.parse::<u32>(0) == Some(session_id) && g.parse::<u8>(1) == Some(role))
            .filter_map(|g| g.get(2).map(escape::decode))
            .flatten()
            .collect()
    }

    fn smart_send(&mut self, session_id: u32, role: u8, data: &[u8]) -> bool {
        self.enable_bluetooth()
            && self.write(
                "+SRBCSMARTSEND",
                &args![session_id, role, escape::quoted(data)],
            )
    }

    /// Value of the first `<prefix>: <session>,<handle>,"<value>"` event.
    fn value_event(
        &self,
        re: &regex::Regex,
        session_id: u32,
        timeout: Duration,
    ) -> Option<Vec<u8>> {
        let groups = self
            .core
            .transport()
            .search_first_where(re, timeout, |g| g.parse::<u32>(0) == Some(session_id))?;
        groups.get(1).map(escape::decode)
    }
}

impl BoardHandle for Euler {
    fn core(&self) -> &BoardCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BoardCore {
        &mut self.core
    }

    fn model(&self) -> BoardModel {
        BoardModel::Euler
    }
}

impl HwApi for Euler {}

impl CommonApi for Euler {
    fn reset(&mut self) -> bool {
        self.forget_local_database();
        self.execute("+RST")
    }

    fn supported_commands(&mut self) -> Option<Vec<String>> {
        if !self.execute("+CLAC") {
            return None;
        }
        Some(
            self.replies(pattern!(r"(AT\+[\w]+)"))
                .iter()
                .filter_map(|g| g.get(0).map(str::to_owned))
                .collect(),
        )
    }

    fn restore_defaults(&mut self) -> bool {
        self.forget_local_database();
        let restored = self.execute("&F");
        // READY is printed before the board accepts commands again
        thread::sleep(self.ready_settle);
        restored
    }

    fn manufacturer_id(&mut self) -> Option<String> {
        if !self.execute("+FMI") {
            return None;
        }
        self.reply(pattern!(r"(?:\+FMI: )?([\w| ]+)"))?
            .get(0)
            .map(|s| s.trim().to_owned())
    }

    fn model_id(&mut self) -> Option<String> {
        if !self.execute("+FMM") {
            return None;
        }
        self.reply(pattern!(r"(?:\+FMM: )?(\w+)"))?
            .get(0)
            .map(str::to_owned)
    }

    fn revision_id(&mut self) -> Option<String> {
        if !self.execute("+FMR") {
            return None;
        }
        self.reply(pattern!(r"(?:\+FMR: )?(\S+)"))?
            .get(0)
            .map(str::to_owned)
    }

    fn remote_controller(&mut self) -> Option<u32> {
        if !self.query("+SRREMCTRL") {
            return None;
        }
        self.reply(pattern!(r"\+SRREMCTRL: (\d+)"))?.parse(0)
    }

    fn set_remote_controller(&mut self, session_id: u32) -> bool {
        self.write("+SRREMCTRL", &args![session_id])
    }
}

impl BleApi for Euler {
    fn local_address(&mut self) -> Option<Bdaddr> {
        if !self.enable_bluetooth() || !self.query("+SRBTADDR") {
            return None;
        }
        let groups = self.reply(pattern!(r#"\+SRBTADDR: "([\w|:]{17})""#))?;
        Bdaddr::new(groups.get(0)?, AddressType::Public).ok()
    }

    fn create_session(&mut self, bdaddr: &Bdaddr) -> Option<BleSession> {
        if !self.enable_bluetooth() {
            return None;
        }
        let wire_addr = address::to_lowercase(bdaddr.addr());
        if !self.write("+SRBLECFG", &args![format!("\"{wire_addr}\"")]) {
            return None;
        }
        let groups = self.core.transport().search_first_where(
            pattern!(SESSION_CFG),
            Duration::ZERO,
            |g| g.get(2).is_some_and(|a| a.eq_ignore_ascii_case(&wire_addr)),
        )?;
        Some(BleSession {
            session_id: groups.parse(0)?,
            bdaddr: Bdaddr::new(groups.get(2)?, bdaddr.addr_type()).ok()?,
        })
    }

    fn delete_session(&mut self, session_id: u32) -> bool {
        self.enable_bluetooth() && self.write("+SRBLEDEL", &args![session_id])
    }

    fn session_id_for(&mut self, bdaddr: &Bdaddr) -> Option<u32> {
        if !self.enable_bluetooth() || !self.query("+SRBLECFG") {
            return None;
        }
        self.replies(pattern!(SESSION_CFG))
            .iter()
            .find(|g| {
                g.get(2)
                    .is_some_and(|a| a.eq_ignore_ascii_case(bdaddr.addr()))
            })
            .and_then(|g| g.parse(0))
    }

    fn sessions(&mut self) -> Option<Vec<BleSession>> {
        if !self.enable_bluetooth() || !self.query("+SRBLECFG") {
            return None;
        }
        Some(
            self.replies(pattern!(SESSION_CFG))
                .iter()
                .filter_map(|g| {
                    Some(BleSession {
                        session_id: g.parse(0)?,
                        bdaddr: Bdaddr::new(g.get(2)?, AddressType::Unknown).ok()?,
                    })
                })
                .collect(),
        )
    }
}

impl GapApi for Euler {
    fn set_advertising_enable(
        &mut self,
        enable: bool,
        adv_data: Option<&[u8]>,
        scan_resp_data: Option<&[u8]>,
    ) -> bool {
        if !self.enable_bluetooth() {
            return false;
        }
        let mut args = args![u8::from(enable)];
        let adv_data = adv_data.filter(|d| !d.is_empty());
        let scan_resp_data = scan_resp_data.filter(|d| !d.is_empty());
        if let Some(data) = adv_data {
            args.push(escape::quoted(data));
        }
        if let Some(data) = scan_resp_data {
            if adv_data.is_none() {
                args.push(escape::quoted(&[]));
            }
            args.push(escape::quoted(data));
        }
        self.write("+SRBLEADV", &args)
    }

    fn set_advertising_parameters(&mut self, params: &AdvertisingParameters) -> bool {
        if !self.enable_bluetooth() {
            return false;
        }
        ignored(self.model(), "timeout");
        ignored(self.model(), "filter_policy");
        self.write(
            "+SRBLEADVPARAMS",
            &args![
                params.interval_min,
                params.interval_max,
                params.adv_type.code()
            ],
        )
    }

    fn scan(&mut self, duration_s: u32, format: ScanResultFormat) -> Option<ScanResults> {
        if !self.enable_bluetooth() {
            return None;
        }
        let timeout = Duration::from_secs(u64::from(duration_s) * 2).max(self.command_timeout);
        let args = args![duration_s, format.code()];
        if !self
            .send("+SRBLESCAN", AtForm::Write(&args), timeout)
            .is_success()
        {
            return None;
        }
        Some(at::scan_results(self.core.transport(), format))
    }

    fn set_scan_parameters(&mut self, params: &ScanParameters) -> bool {
        self.enable_bluetooth()
            && self.write(
                "+SRBLESCANPARAMS",
                &args![params.scan_type.code(), params.interval, params.window],
            )
    }

    /// Connects once; the board retries internally.
    fn connect(&mut self, session_id: u32, max_attempts: u32) -> bool {
        if max_attempts != 1 {
            ignored(self.model(), "max_attempts");
        }
        self.enable_bluetooth()
            && self.write("+SRBLECNX", &args![session_id])
            && self.wait_for_connection(CONNECTION_TIMEOUT)
    }

    fn wait_for_connection(&mut self, timeout: Duration) -> bool {
        let connected = self
            .core
            .transport()
            .search_first_where(pattern!(r"\+SRBLE_IND: (\d+),(\d)"), timeout, |g| {
                g.parse::<u8>(1) == Some(1)
            })
            .is_some();
        if connected {
            // MTU exchange and BC Smart registration follow the event
            thread::sleep(self.connection_settle);
        }
        connected
    }

    fn disconnect(&mut self, session_id: u32) -> bool {
        self.enable_bluetooth()
            && self.write("+SRBLECLOSE", &args![session_id])
            && self.wait_for_disconnection(session_id, GATT_TIMEOUT)
    }

    fn wait_for_disconnection(&mut self, session_id: u32, timeout: Duration) -> bool {
        self.core
            .transport()
            .search_first_where(pattern!(r"\+SRBLE_IND: (\d+),(0),(\d+)"), timeout, |g| {
                g.parse::<u32>(0) == Some(session_id)
            })
            .is_some()
    }

    fn is_connected(&mut self, session_id: u32) -> Option<bool> {
        self.session_entry(session_id)?
            .parse::<u8>(1)
            .map(|connected| connected == 1)
    }
}

impl GattApi for Euler {
    fn local_mtu(&mut self) -> Option<u16> {
        if !self.enable_bluetooth() || !self.query("+SRBLE") {
            return None;
        }
        self.reply(pattern!(r#"\+SRBLE: "([^"]*)",(\d+),(\d)"#))?
            .parse(1)
    }

    fn exchanged_mtu(&mut self, session_id: u32) -> Option<u16> {
        self.session_entry(session_id)?.parse(3)
    }

    fn discover_primary_services(&mut self, session_id: u32) -> Option<Vec<GattService>> {
        if !self.enable_bluetooth() || !self.write("+SRBLEDISCSERV", &args![session_id]) {
            return None;
        }
        let re = pattern!(r#"\+SRBLEDISCSERV: (\d+),"([0-9a-f|\-]+)",(1),(\d+),(\d+)"#);
        Some(
            self.replies(re)
                .iter()
                .filter(|g| g.parse::<u32>(0) == Some(session_id))
                .filter_map(|g| {
                    Some(GattService {
                        uuid: g.get(1)?.to_ascii_uppercase(),
                        is_primary: true,
                        start_handle: g.parse(3)?,
                        end_handle: g.parse(4)?,
                    })
                })
                .collect(),
        )
    }

    fn discover_characteristics(&mut self, session_id: u32) -> Option<Vec<GattCharacteristic>> {
        if !self.enable_bluetooth() || !self.write("+SRBLEDISCCHAR", &args![session_id]) {
            return None;
        }
        let re = pattern!(r#"\+SRBLEDISCCHAR: (\d+),"([0-9a-f|\-]+)",(\d+),(\d+)"#);
        Some(
            self.replies(re)
                .iter()
                .filter(|g| g.parse::<u32>(0) == Some(session_id))
                .filter_map(|g| {
                    Some(GattCharacteristic {
                        uuid: g.get(1)?.to_ascii_uppercase(),
                        handle: g.parse(3)?,
                        properties: CharProperties(g.parse(2)?),
                    })
                })
                .collect(),
        )
    }

    fn add_primary_service(&mut self, uuid: &str) -> Option<u16> {
        if !self.enable_bluetooth() || !self.write("+SRBLEADDSERV", &args![uuid]) {
            return None;
        }
        let handle = self.reply(pattern!(r"\+SRBLEADDSERV: (\d+)"))?.parse(0)?;
        self.service_handle = Some(handle);
        self.characteristic_handle = None;
        Some(handle)
    }

    /// Added to the service from the last [`GattApi::add_primary_service`].
    fn add_characteristic(&mut self, definition: &CharacteristicDefinition) -> bool {
        let Some(service) = self.service_handle else {
            warn!(board = %self.model(), "no local service to add a characteristic to");
            return false;
        };
        let args = args![
            service,
            definition.uuid,
            definition.properties.bits(),
            definition.permissions.bits(),
            definition.max_length,
            definition.value.len(),
            escape::quoted(&definition.value),
            u8::from(definition.variable_length)
        ];
        if !self.enable_bluetooth() || !self.write("+SRBLEADDCHAR", &args) {
            return false;
        }
        self.characteristic_handle = self
            .reply(pattern!(r"\+SRBLEADDCHAR: (\d+)"))
            .and_then(|g| g.parse(0));
        self.characteristic_handle.is_some()
    }

    /// Added after the last characteristic, in the service owning it.
    fn add_descriptor(&mut self, definition: &DescriptorDefinition) -> bool {
        let Some(service) = self.characteristic_handle.and_then(Self::service_handle_for) else {
            warn!(board = %self.model(), "no local characteristic to add a descriptor to");
            return false;
        };
        let args = args![
            service,
            definition.uuid,
            definition.permissions.bits(),
            definition.max_length,
            definition.value.len(),
            escape::quoted(&definition.value),
            u8::from(definition.variable_length)
        ];
        self.enable_bluetooth()
            && self.write("+SRBLEADDCHARDESCR", &args)
            && self.reply(pattern!(r"\+SRBLEADDCHARDESCR: (\d+)")).is_some()
    }

    /// `OK` only follows once the peer answered, so anything but an
    /// explicit error counts as sent.
    fn read_request(&mut self, session_id: u32, handle: u16) -> bool {
        if !self.enable_bluetooth() {
            return false;
        }
        let command = match self.is_characteristic(session_id, handle) {
            Some(true) => "+SRBLEREADCHAR",
            Some(false) => "+SRBLEREADDESC",
            None => return false,
        };
        let args = args![session_id, handle];
        !matches!(
            self.send(command, AtForm::Write(&args), self.command_timeout),
            CommandResult::Error | CommandResult::ProtocolError(_)
        )
    }

    fn wait_for_read_request(&mut self, session_id: u32, handle: u16, timeout: Duration) -> bool {
        self.core
            .transport()
            .search_first_where(pattern!(r"\+SRBLEREAD: (\d+),(\d+),(\d+)"), timeout, |g| {
                g.parse::<u32>(0) == Some(session_id) && g.parse::<u16>(2) == Some(handle)
            })
            .is_some()
    }

    /// Read requests cannot be rejected; `offset` is not sent.
    fn read_response(
        &mut self,
        session_id: u32,
        handle: u16,
        accept: bool,
        value: &[u8],
        _offset: u16,
    ) -> bool {
        if !accept {
            warn!(board = %self.model(), "read requests cannot be rejected");
            return false;
        }
        let Some(transfer_id) = self.transfer_id(session_id, handle) else {
            warn!(board = %self.model(), session_id, handle, "no read request to answer");
            return false;
        };
        self.enable_bluetooth()
            && self.write(
                "+SRBLEREADRESP",
                &args![session_id, transfer_id, handle, escape::quoted(value)],
            )
    }

    fn wait_for_read_response(
        &mut self,
        session_id: u32,
        _handle: u16,
        timeout: Duration,
    ) -> Option<Vec<u8>> {
        ignored(self.model(), "handle");
        self.value_event(
            pattern!(r#"\+SRBLEREADCHAR: (\d+),\d+,"([^\r\n]*)"[\r\n]"#),
            session_id,
            timeout,
        )
    }

    fn write_request(&mut self, session_id: u32, handle: u16, value: &[u8], need_rsp: bool) -> bool {
        if !self.enable_bluetooth() {
            return false;
        }
        let command = match self.is_characteristic(session_id, handle) {
            Some(true) if need_rsp => "+SRBLEWRITECHAR",
            Some(true) => "+SRBLEWRITECHARNORSP",
            Some(false) => "+SRBLEWRITEDESC",
            None => return false,
        };
        self.write(command, &args![session_id, handle, escape::quoted(value)])
    }

    /// Offsets are not reported and writes are acknowledged by the firmware.
    fn wait_for_write_request(
        &mut self,
        session_id: u32,
        handle: u16,
        timeout: Duration,
    ) -> Option<GattWriteRequest> {
        let groups = self.core.transport().search_first_where(
            pattern!(r#"\+SRBLEWRITE: (\d+),(\d+),"([^\r\n]*)"[\r\n]"#),
            timeout,
            |g| g.parse::<u32>(0) == Some(session_id) && g.parse::<u16>(1) == Some(handle),
        )?;
        Some(GattWriteRequest {
            session_id,
            handle,
            offset: 0,
            value: escape::decode(groups.get(2)?),
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
        _timeout: Duration,
    ) -> bool {
        // the write command's own OK already carried the response
        warn!(board = %self.model(), "write responses are not reported");
        true
    }

    fn notification_request(&mut self, session_id: u32, handle: u16, value: &[u8]) -> bool {
        self.enable_bluetooth()
            && self.write(
                "+SRBLENOTIFY",
                &args![session_id, handle, escape::quoted(value)],
            )
    }

    fn wait_for_notification(
        &mut self,
        session_id: u32,
        _handle: u16,
        timeout: Duration,
    ) -> Option<Vec<u8>> {
        self.value_event(
            pattern!(r#"\+SRBLENOTIFICATION: (\d+),\d+,"([^\r\n]*)"[\r\n]"#),
            session_id,
            timeout,
        )
    }

    fn indication_request(&mut self, session_id: u32, handle: u16, value: &[u8]) -> bool {
        self.enable_bluetooth()
            && self.write(
                "+SRBLEINDICATE",
                &args![session_id, handle, escape::quoted(value)],
            )
    }

    fn wait_for_indication(
        &mut self,
        session_id: u32,
        _handle: u16,
        timeout: Duration,
    ) -> Option<Vec<u8>> {
        self.value_event(
            pattern!(r#"\+SRBLEINDICATION: (\d+),\d+,"([^\r\n]*)"[\r\n]"#),
            session_id,
            timeout,
        )
    }

    fn indication_response(&mut self, _session_id: u32, _handle: u16) -> bool {
        true
    }

    fn wait_for_indication_response(
        &mut self,
        _session_id: u32,
        _handle: u16,
        timeout: Duration,
    ) -> bool {
        !self
            .core
            .transport()
            .search_all(pattern!("(OK)"), timeout)
            .is_empty()
    }
}

const ROLE_CLIENT: u8 = 0;
const ROLE_SERVER: u8 = 1;

impl BcSmartApi for Euler {
    fn server_send_data(&mut self, session_id: u32, data: &[u8]) -> bool {
        self.smart_send(session_id, ROLE_SERVER, data)
    }

    fn server_wait_for_data(&mut self, session_id: u32, timeout: Duration) -> Option<Vec<u8>> {
        Some(self.smart_data(session_id, ROLE_SERVER, timeout))
    }

    fn server_wait_for_command(&mut self, _session_id: u32, timeout: Duration) -> Option<String> {
        self.core
            .transport()
            .search_first(pattern!(r#"\+SRREMCMD: "(.+?)""#), timeout)?
            .get(0)
            .map(str::to_owned)
    }

    fn client_send_data(&mut self, session_id: u32, data: &[u8]) -> bool {
        self.smart_send(session_id, ROLE_CLIENT, data)
    }

    fn client_wait_for_data(&mut self, session_id: u32, timeout: Duration) -> Option<Vec<u8>> {
        Some(self.smart_data(session_id, ROLE_CLIENT, timeout))
    }

    fn client_send_command(&mut self, session_id: u32, command: &str) -> bool {
        // the remote command line carries its own terminator
        self.enable_bluetooth()
            && self.write(
                "+SRBCSMARTCMD",
                &args![session_id, format!("{command}{}", crate::protocol::EOL)],
            )
    }

    /// Response lines, split on the escaped CR LF the peer sends.
    fn client_wait_for_command_response(
        &mut self,
        session_id: u32,
        timeout: Duration,
    ) -> Option<Vec<String>> {
        let text: String = self
            .core
            .transport()
            .search_all(pattern!(r#"\+SRBCSMARTRSP: (\d+),"([^\r\n]*)"[\r\n]"#), timeout)
            .iter()
            .filter(|g| g.parse::<u32>(0) == Some(session_id))
            .filter_map(|g| g.get(1))
            .collect();
        if text.is_empty() {
            return None;
        }
        Some(text.split(r"\0d\0a").map(str::to_owned).collect())
    }
}
