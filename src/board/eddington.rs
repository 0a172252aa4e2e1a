//! BC310X (Eddington) driver.
//!
//! AT command set. Commands answer `OK`, `ERROR` or `+CME ERROR: <code>`;
//! `+RST` answers with a `Ready` banner instead of `OK`. BLE sessions are
//! native board objects created with `+SRBLECFG`. Binary values travel as
//! `\XX` escapes inside quoted arguments.

use super::{at, BoardCore, BoardModel};
use crate::capability::*;
use crate::config::EddingtonConfig;
use crate::protocol::{args, at_command, escape, round_trip, AtForm, CommandResult, StatusRule};
use crate::transport::{pattern, Groups};
use std::time::Duration;

/// `+SRBLECFG` reply: session, connected, address, then optional type and MTU.
const SESSION_CFG: &str = r#"\+SRBLECFG: (\d+),([0|1]),"([\w|:]{17})"(,(\d),(\d+))?"#;

#[derive(Debug)]
pub struct Eddington {
    core: BoardCore,
    command_timeout: Duration,
}

impl Eddington {
    pub fn new(core: BoardCore, config: &EddingtonConfig) -> Self {
        Self {
            core,
            command_timeout: config.command_timeout(),
        }
    }

    fn rules(command: &str) -> Vec<StatusRule> {
        let mut rules = vec![
            StatusRule::success(if command == "+RST" { "Ready" } else { "OK" }),
            StatusRule::error("ERROR"),
            StatusRule::protocol_error("+CME"),
        ];
        if command == "&F" {
            // the factory restore prints nothing recognisable; any output will do
            rules.push(StatusRule::success(""));
        }
        rules
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

    /// First match of `re` in what the last command printed.
    fn reply(&self, re: &regex::Regex) -> Option<Groups> {
        self.core.transport().search_first(re, Duration::ZERO)
    }

    fn replies(&self, re: &regex::Regex) -> Vec<Groups> {
        self.core.transport().search_all(re, Duration::ZERO)
    }

    /// Query every session the board knows about.
    fn session_table(&mut self) -> Option<Vec<Groups>> {
        if !self.query("+SRBLECFG") {
            return None;
        }
        Some(self.replies(pattern!(SESSION_CFG)))
    }

    fn session_entry(&mut self, session_id: u32) -> Option<Groups> {
        self.session_table()?
            .into_iter()
            .find(|g| g.parse::<u32>(0) == Some(session_id))
    }
}

fn parse_level(groups: &Groups, index: usize) -> Option<GpioLevel> {
    groups.parse::<u8>(index).and_then(GpioLevel::from_code)
}

impl BoardHandle for Eddington {
    fn core(&self) -> &BoardCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BoardCore {
        &mut self.core
    }

    fn model(&self) -> BoardModel {
        BoardModel::Eddington
    }
}

impl HwApi for Eddington {
    fn set_uart_baudrate(&mut self, baud_rate: u32) -> bool {
        self.write("+IPR", &args![baud_rate]) && self.core.set_serial_baudrate(baud_rate)
    }

    fn set_uart_flow_control(&mut self, enable: bool) -> bool {
        let command = if enable { "&K=3" } else { "&K=0" };
        self.execute(command) && self.core.serial_flow_control(enable)
    }

    fn uart_baudrate(&mut self) -> Option<u32> {
        if !self.query("+IPR") {
            return None;
        }
        self.reply(pattern!(r"\+IPR: (\d+)"))?.parse(0)
    }

    fn save_settings(&mut self) -> bool {
        self.execute("&W")
    }

    fn gpio_configure(&mut self, gpio: u8, direction: GpioDirection, pull: GpioPull) -> bool {
        self.write(
            "+KGPIOCFG",
            &args![gpio, direction as u8, pull as u8],
        )
    }

    fn gpio_read(&mut self, gpio: u8) -> Option<GpioLevel> {
        // value 2 asks for the current level
        if !self.write("+KGPIO", &args![gpio, 2]) {
            return None;
        }
        let groups = self.reply(pattern!(r"\+KGPIOCFG: (\d+), ([0|1])"))?;
        parse_level(&groups, 1)
    }

    fn gpio_write(&mut self, gpio: u8, level: GpioLevel) -> bool {
        self.write("+KGPIO", &args![gpio, level.code()])
    }

    fn gpio_wait_for_event(&mut self, gpio: u8, timeout: Duration) -> Vec<GpioEvent> {
        self.core
            .transport()
            .search_all(pattern!(r"\+KGPIO: (\d+), (\d)"), timeout)
            .iter()
            .filter(|g| g.parse::<u8>(0) == Some(gpio))
            .filter_map(|g| {
                Some(GpioEvent {
                    gpio,
                    level: parse_level(g, 1)?,
                })
            })
            .collect()
    }
}

impl CommonApi for Eddington {
    fn send_custom_command(&mut self, command: &str) -> bool {
        round_trip(
            self.core.transport_mut(),
            command,
            &Self::rules(command),
            self.command_timeout,
        )
        .is_success()
    }

    fn reset(&mut self) -> bool {
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
        self.execute("&F")
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

    fn bt_mac(&mut self) -> Option<String> {
        if !self.query("+MACADDR") {
            return None;
        }
        self.reply(pattern!(r"\+MACADDR: ([\w|:]{17})"))?
            .get(0)
            .map(str::to_owned)
    }

    fn factory_serial_number(&mut self) -> Option<String> {
        if !self.execute("+CGSN") {
            return None;
        }
        self.reply(pattern!(r"(\d[A-Z]\d{12})"))?
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

impl BleApi for Eddington {
    fn local_address(&mut self) -> Option<Bdaddr> {
        if !self.query("+SRBLEADDR") {
            return None;
        }
        let groups = self.reply(pattern!(r#"\+SRBLEADDR: "([\w|:]{17})",(\d)"#))?;
        Bdaddr::new(groups.get(0)?, at::address_type(&groups, 1)?).ok()
    }

    fn create_session(&mut self, bdaddr: &Bdaddr) -> Option<BleSession> {
        if !self.write("+SRBLECFG", &args![format!("\"{}\"", bdaddr.addr())]) {
            return None;
        }
        let groups = self.reply(pattern!(SESSION_CFG))?;
        Some(BleSession {
            session_id: groups.parse(0)?,
            bdaddr: Bdaddr::new(groups.get(2)?, bdaddr.addr_type()).ok()?,
        })
    }

    fn delete_session(&mut self, session_id: u32) -> bool {
        self.write("+SRBLEDEL", &args![session_id])
    }

    fn session_id_for(&mut self, bdaddr: &Bdaddr) -> Option<u32> {
        self.session_table()?
            .iter()
            .find(|g| {
                g.get(2)
                    .is_some_and(|addr| addr.eq_ignore_ascii_case(bdaddr.addr()))
            })
            .and_then(|g| g.parse(0))
    }

    fn sessions(&mut self) -> Option<Vec<BleSession>> {
        Some(
            self.session_table()?
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

impl GapApi for Eddington {
    fn set_advertising_enable(
        &mut self,
        enable: bool,
        adv_data: Option<&[u8]>,
        scan_resp_data: Option<&[u8]>,
    ) -> bool {
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
        ignored(self.model(), "interval_max");
        let mut args = args![params.adv_type.code(), params.interval_min, params.timeout];
        if params.filter_policy.code() != 0 {
            args.push(params.filter_policy.code().to_string());
        }
        self.write("+SRBLEADVPARAMS", &args)
    }

    fn set_preferred_connection_parameters(
        &mut self,
        params: &PreferredConnectionParameters,
    ) -> bool {
        self.write(
            "+SRBLEPPCP",
            &args![
                params.min_interval,
                params.max_interval,
                params.latency,
                params.supervision_timeout
            ],
        )
    }

    fn scan(&mut self, duration_s: u32, format: ScanResultFormat) -> Option<ScanResults> {
        let timeout = self.command_timeout + Duration::from_secs(u64::from(duration_s));
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
        self.write(
            "+SRBLESCANPARAMS",
            &args![params.scan_type.code(), params.interval, params.window],
        )
    }

    fn scan_parameters(&mut self) -> Option<ScanParameters> {
        if !self.query("+SRBLESCANPARAMS") {
            return None;
        }
        let groups = self.reply(pattern!(r"\+SRBLESCANPARAMS: (\d+),(\d+),(\d+)"))?;
        Some(ScanParameters {
            scan_type: groups.parse::<u8>(0).and_then(ScanType::from_code)?,
            interval: groups.parse(1)?,
            window: groups.parse(2)?,
        })
    }

    fn set_connection_parameters(&mut self, session_id: u32, params: &ConnectionParameters) -> bool {
        self.write(
            "+SRBLECONNPARAMS",
            &args![
                session_id,
                params.interval,
                params.latency,
                params.supervision_timeout
            ],
        )
    }

    fn connection_parameters(&mut self) -> Option<(u32, ConnectionParameters)> {
        if !self.query("+SRBLECONNPARAMS") {
            return None;
        }
        let groups = self.reply(pattern!(r"\+SRBLECONNPARAMS: (\d+),(\d+),(\d+),(\d+)"))?;
        Some((
            groups.parse(0)?,
            ConnectionParameters {
                interval: groups.parse(1)?,
                latency: groups.parse(2)?,
                supervision_timeout: groups.parse(3)?,
            },
        ))
    }

    fn wait_for_connection(&mut self, timeout: Duration) -> bool {
        self.core
            .transport()
            .search_first_where(pattern!(r"\+SRBLE_IND: (\d+),(\d)"), timeout, |g| {
                g.parse::<u8>(1) == Some(1)
            })
            .is_some()
    }

    fn disconnect(&mut self, session_id: u32) -> bool {
        self.write("+SRBLECLOSE", &args![session_id])
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

impl GattApi for Eddington {
    fn local_mtu(&mut self) -> Option<u16> {
        if !self.query("+SRBLE") {
            return None;
        }
        self.reply(pattern!(r#"\+SRBLE: "([^\r]+)",(\d+),(\d)"#))?
            .parse(1)
    }

    fn exchanged_mtu(&mut self, session_id: u32) -> Option<u16> {
        self.session_entry(session_id)?.parse(5)
    }

    fn add_service(&mut self, uuid: &str, is_primary: bool) -> bool {
        self.write("+SRBLEADDSERV", &args![uuid, u8::from(is_primary)])
    }

    fn add_characteristic(&mut self, definition: &CharacteristicDefinition) -> bool {
        self.write(
            "+SRBLEADDCHAR",
            &args![
                definition.uuid,
                format!("{:02X}", definition.properties.bits()),
                format!("{:02X}", definition.permissions.bits()),
                definition.max_length,
                u8::from(definition.variable_length),
                escape::quoted(&definition.value)
            ],
        )
    }

    fn add_descriptor(&mut self, definition: &DescriptorDefinition) -> bool {
        self.write(
            "+SRBLEADDDSCR",
            &args![
                definition.uuid,
                format!("{:02X}", definition.permissions.bits()),
                definition.max_length,
                u8::from(definition.variable_length),
                escape::quoted(&definition.value)
            ],
        )
    }

    fn profile_setup(&mut self, action: ProfileSetup) -> Option<Vec<ProfileSetupEntry>> {
        if !self.write("+SRBLEPROFILESETUP", &args![action.code()]) {
            return None;
        }
        Some(
            self.replies(pattern!(r"\+SRBLEPROFILESETUP: (\d+),?(\d+)?"))
                .iter()
                .filter_map(|g| {
                    Some(ProfileSetupEntry {
                        status: g.parse(0)?,
                        handle: g.parse(1),
                    })
                })
                .collect(),
        )
    }

    fn wait_for_read_request(&mut self, session_id: u32, handle: u16, timeout: Duration) -> bool {
        self.core
            .transport()
            .search_first_where(pattern!(r"\+SRBLEREAD_REQ: (\d+),(\d+)"), timeout, |g| {
                g.parse::<u32>(0) == Some(session_id) && g.parse::<u16>(1) == Some(handle)
            })
            .is_some()
    }

    fn read_response(
        &mut self,
        session_id: u32,
        handle: u16,
        accept: bool,
        value: &[u8],
        offset: u16,
    ) -> bool {
        let mut args = args![session_id, handle, u8::from(accept)];
        if accept {
            args.push(escape::quoted(value));
            args.push(offset.to_string());
        }
        self.write("+SRBLEREADRESP", &args)
    }

    fn wait_for_write_request(
        &mut self,
        session_id: u32,
        handle: u16,
        timeout: Duration,
    ) -> Option<GattWriteRequest> {
        let re = pattern!(r#"\+SRBLEWRITE_(REQ|IND): (\d+),(\d+),(\d+),(\d+),"([^\r\n]*)"[\r\n]"#);
        let groups = self.core.transport().search_first_where(re, timeout, |g| {
            g.parse::<u32>(1) == Some(session_id) && g.parse::<u16>(2) == Some(handle)
        })?;
        Some(GattWriteRequest {
            session_id,
            handle,
            offset: groups.parse(3)?,
            value: escape::decode(groups.get(5)?),
            need_rsp: groups.get(0) == Some("REQ"),
        })
    }

    fn write_response(&mut self, session_id: u32, handle: u16, accept: bool) -> bool {
        self.write("+SRBLEWRITERESP", &args![session_id, handle, u8::from(accept)])
    }

    fn notification_request(&mut self, session_id: u32, handle: u16, value: &[u8]) -> bool {
        self.write(
            "+SRBLENOTIFY",
            &args![session_id, handle, escape::quoted(value)],
        )
    }

    fn indication_request(&mut self, session_id: u32, handle: u16, value: &[u8]) -> bool {
        self.write(
            "+SRBLEINDICATE",
            &args![session_id, handle, escape::quoted(value)],
        )
    }

    /// The firmware confirms indications by itself.
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
            .search_first(pattern!("OK"), timeout)
            .is_some()
    }
}

impl BcSmartApi for Eddington {
    fn server_send_data(&mut self, session_id: u32, data: &[u8]) -> bool {
        // role 1: local GATT server
        self.write(
            "+SRBCSMARTSEND",
            &args![session_id, 1, escape::quoted(data)],
        )
    }

    fn server_wait_for_data(&mut self, session_id: u32, timeout: Duration) -> Option<Vec<u8>> {
        let re = pattern!(r#"\+SRBCSMARTRECV: (\d+),(\d+),"([^\r\n]*)"[\r\n]"#);
        let payloads: Vec<String> = self
            .core
            .transport()
            .search_all(re, timeout)
            .iter()
            .filter(|g| g.parse::<u32>(0) == Some(session_id) && g.parse::<u8>(1) == Some(0))
            .filter_map(|g| g.get(2).map(str::to_owned))
            .collect();
        // an empty payload still counts as received
        if payloads.is_empty() {
            return None;
        }
        Some(payloads.iter().flat_map(|p| escape::decode(p)).collect())
    }

    fn server_wait_for_command(&mut self, _session_id: u32, timeout: Duration) -> Option<String> {
        self.core
            .transport()
            .search_first(pattern!(r#"\+SRREMCMD: "(.+?)""#), timeout)?
            .get(0)
            .map(str::to_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::testing::mock_core;
    use crate::port::MockSerialPort;
    use pretty_assertions::assert_eq;

    fn board() -> (Eddington, MockSerialPort) {
        let (core, mock) = mock_core(BoardModel::Eddington);
        let config = EddingtonConfig {
            command_timeout_ms: 300,
        };
        (Eddington::new(core, &config), mock)
    }

    fn addr(s: &str) -> Bdaddr {
        Bdaddr::new(s, AddressType::Public).unwrap()
    }

    #[test]
    fn test_manufacturer_id() {
        let (mut board, mock) = board();
        mock.reply_to("AT+FMI\r", "\r\n+FMI: Acme Corp\r\n\r\nOK\r\n");
        assert_eq!(board.manufacturer_id(), Some("Acme Corp".to_string()));
    }

    #[test]
    fn test_manufacturer_id_error_and_timeout() {
        let (mut board, mock) = board();
        mock.reply_to("AT+FMI\r", "ERROR\r\n");
        assert_eq!(board.manufacturer_id(), None);
        // nothing scripted: the command times out
        assert_eq!(board.manufacturer_id(), None);
        assert_eq!(mock.written_text(), vec!["AT+FMI\r", "AT+FMI\r"]);
    }

    #[test]
    fn test_reset_waits_for_ready_banner() {
        let (mut board, mock) = board();
        mock.reply_to("AT+RST\r", "OK\r\n");
        assert!(!board.reset());
        mock.reply_to("AT+RST\r", "\r\nReady\r\n");
        assert!(board.reset());
    }

    #[test]
    fn test_restore_defaults_accepts_any_output() {
        let (mut board, mock) = board();
        mock.reply_to("AT&F\r", "\u{0}\r\n");
        assert!(board.restore_defaults());
    }

    #[test]
    fn test_revision_and_model() {
        let (mut board, mock) = board();
        mock.reply_to("AT+FMR\r", "+FMR: 1.4.2-rc1\r\nOK\r\n");
        mock.reply_to("AT+FMM\r", "+FMM: BC310X\r\nOK\r\n");
        assert_eq!(board.revision_id(), Some("1.4.2-rc1".to_string()));
        assert_eq!(CommonApi::model_id(&mut board), Some("BC310X".to_string()));
    }

    #[test]
    fn test_supported_commands() {
        let (mut board, mock) = board();
        mock.reply_to("AT+CLAC\r", "AT+FMI\r\nAT+FMM\r\nAT+SRBLECFG\r\nOK\r\n");
        assert_eq!(
            board.supported_commands(),
            Some(vec![
                "AT+FMI".to_string(),
                "AT+FMM".to_string(),
                "AT+SRBLECFG".to_string()
            ])
        );
    }

    #[test]
    fn test_structured_error_is_failure() {
        let (mut board, mock) = board();
        mock.reply_to("AT+SRBLEDEL=4\r", "+CME ERROR: 916\r\n");
        assert!(!board.delete_session(4));
    }

    #[test]
    fn test_uart_baudrate_follows_host() {
        let (mut board, mock) = board();
        mock.reply_to("AT+IPR=9600\r", "OK\r\n");
        assert!(board.set_uart_baudrate(9600));
        assert_eq!(mock.baud_rate(), 9600);

        mock.reply_to("AT+IPR?\r", "+IPR: 9600\r\nOK\r\n");
        assert_eq!(board.uart_baudrate(), Some(9600));
    }

    #[test]
    fn test_flow_control() {
        let (mut board, mock) = board();
        mock.reply_to("AT&K=3\r", "OK\r\n");
        assert!(board.set_uart_flow_control(true));
        assert_eq!(mock.flow_control(), Some(crate::port::FlowControl::Software));
    }

    #[test]
    fn test_gpio() {
        let (mut board, mock) = board();
        mock.reply_to("AT+KGPIOCFG=5,1,2\r", "OK\r\n");
        mock.reply_to("AT+KGPIO=5,2\r", "+KGPIOCFG: 5, 1\r\nOK\r\n");
        mock.reply_to("AT+KGPIO=6,1\r", "OK\r\n");
        assert!(board.gpio_configure(5, GpioDirection::Input, GpioPull::None));
        assert_eq!(board.gpio_read(5), Some(GpioLevel::High));
        assert!(board.gpio_write(6, GpioLevel::High));
    }

    #[test]
    fn test_gpio_wait_for_event_filters_pin() {
        let (mut board, mock) = board();
        mock.enqueue_read("+KGPIO: 5, 1\r\n+KGPIO: 7, 1\r\n+KGPIO: 5, 0\r\n");
        let events = board.gpio_wait_for_event(5, Duration::from_millis(80));
        assert_eq!(
            events,
            vec![
                GpioEvent { gpio: 5, level: GpioLevel::High },
                GpioEvent { gpio: 5, level: GpioLevel::Low },
            ]
        );
    }

    #[test]
    fn test_local_address() {
        let (mut board, mock) = board();
        mock.reply_to("AT+SRBLEADDR?\r", "+SRBLEADDR: \"20:fa:bb:00:01:80\",1\r\nOK\r\n");
        let local = board.local_address().unwrap();
        assert_eq!(local.addr(), "20:FA:BB:00:01:80");
        assert_eq!(local.addr_type(), AddressType::Private);
    }

    #[test]
    fn test_create_and_list_sessions() {
        let (mut board, mock) = board();
        mock.reply_to(
            "AT+SRBLECFG=\"20:FA:BB:00:01:80\"\r",
            "+SRBLECFG: 3,0,\"20:FA:BB:00:01:80\"\r\nOK\r\n",
        );
        let session = board.create_session(&addr("20:fa:bb:00:01:80")).unwrap();
        assert_eq!(session.session_id, 3);

        let table = "+SRBLECFG: 1,1,\"00:11:22:33:44:55\",0,158\r\n\
                     +SRBLECFG: 3,0,\"20:FA:BB:00:01:80\"\r\nOK\r\n";
        mock.reply_to("AT+SRBLECFG?\r", table);
        mock.reply_to("AT+SRBLECFG?\r", table);
        mock.reply_to("AT+SRBLECFG?\r", table);
        mock.reply_to("AT+SRBLECFG?\r", table);

        assert_eq!(board.session_id_for(&addr("20:FA:BB:00:01:80")), Some(3));
        let sessions = board.sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].bdaddr.addr_type(), AddressType::Unknown);
        assert_eq!(board.is_connected(1), Some(true));
        assert_eq!(board.exchanged_mtu(1), Some(158));
    }

    #[test]
    fn test_advertising_enable_payloads() {
        let (mut board, mock) = board();
        mock.reply_to("AT+SRBLEADV=1,\"\\02\\01\\06\"\r", "OK\r\n");
        assert!(board.set_advertising_enable(true, Some(&[0x02, 0x01, 0x06]), None));
        mock.reply_to("AT+SRBLEADV=0\r", "OK\r\n");
        assert!(board.set_advertising_enable(false, None, None));
        mock.verify_script().unwrap();
    }

    #[test]
    fn test_advertising_parameters_drop_interval_max() {
        let (mut board, mock) = board();
        mock.reply_to("AT+SRBLEADVPARAMS=0,32,0\r", "OK\r\n");
        let params = AdvertisingParameters {
            adv_type: AdvertisingType::Ind,
            interval_min: 32,
            interval_max: 64,
            timeout: 0,
            filter_policy: AdvFilterPolicy::Any,
        };
        assert!(board.set_advertising_parameters(&params));
        mock.verify_script().unwrap();
    }

    #[test]
    fn test_scan_parsed() {
        let (mut board, mock) = board();
        mock.reply_to(
            "AT+SRBLESCAN=1,0\r",
            "+SRBLESCAN: \"20:fa:bb:00:01:80\",0,-67,6,\"Speaker\"\r\n\
             +SRBLESCAN: \"00:11:22:33:44:55\",1,-80,2\r\nOK\r\n",
        );
        let Some(ScanResults::Parsed(results)) = board.scan(1, ScanResultFormat::Default) else {
            panic!("expected parsed results");
        };
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].addr, "20:FA:BB:00:01:80");
        assert_eq!(results[0].rssi, -67);
        assert_eq!(results[0].flag, 6);
        assert_eq!(results[0].name.as_deref(), Some("Speaker"));
        assert_eq!(results[1].addr_type, AddressType::Private);
        assert_eq!(results[1].name, None);
    }

    #[test]
    fn test_scan_raw() {
        let (mut board, mock) = board();
        mock.reply_to(
            "AT+SRBLESCAN=1,1\r",
            "+SRBLESCAN: \"20:FA:BB:00:01:80\",0,-67,\"\\02\\01\\06\"\r\nOK\r\n",
        );
        let Some(ScanResults::Raw(results)) = board.scan(1, ScanResultFormat::RawData) else {
            panic!("expected raw results");
        };
        assert_eq!(results[0].raw_data, vec![0x02, 0x01, 0x06]);
    }

    #[test]
    fn test_scan_and_connection_parameters() {
        let (mut board, mock) = board();
        mock.reply_to("AT+SRBLESCANPARAMS?\r", "\r\n+SRBLESCANPARAMS: 1,96,48\r\nOK\r\n");
        mock.reply_to("AT+SRBLECONNPARAMS?\r", "\r\n+SRBLECONNPARAMS: 2,24,0,400\r\nOK\r\n");
        assert_eq!(
            board.scan_parameters(),
            Some(ScanParameters {
                scan_type: ScanType::Active,
                interval: 96,
                window: 48
            })
        );
        let (session_id, params) = board.connection_parameters().unwrap();
        assert_eq!(session_id, 2);
        assert_eq!(params.supervision_timeout, 400);
    }

    #[test]
    fn test_connect_is_unsupported() {
        let (mut board, mock) = board();
        assert!(!board.connect(1, CONNECT_ATTEMPTS));
        assert!(mock.written_text().is_empty());
    }

    #[test]
    fn test_connection_events() {
        let (mut board, mock) = board();
        mock.enqueue_read("+SRBLE_IND: 2,0,19\r\n+SRBLE_IND: 1,1\r\n");
        assert!(board.wait_for_connection(Duration::from_millis(200)));

        mock.reply_to("AT+SRBLECLOSE=1\r", "OK\r\n+SRBLE_IND: 1,0,22\r\n");
        assert!(board.disconnect(1));
    }

    #[test]
    fn test_wait_for_disconnection_other_session() {
        let (mut board, mock) = board();
        mock.enqueue_read("+SRBLE_IND: 2,0,19\r\n");
        assert!(!board.wait_for_disconnection(1, Duration::from_millis(50)));
    }

    #[test]
    fn test_local_database() {
        let (mut board, mock) = board();
        mock.reply_to("AT+SRBLEADDSERV=180D,1\r", "OK\r\n");
        mock.reply_to("AT+SRBLEADDCHAR=2A37,12,11,20,1,\"\\00\"\r", "OK\r\n");
        mock.reply_to("AT+SRBLEADDDSCR=2902,11,2,0,\"\\00\\00\"\r", "OK\r\n");
        mock.reply_to(
            "AT+SRBLEPROFILESETUP=0\r",
            "+SRBLEPROFILESETUP: 0,256\r\n+SRBLEPROFILESETUP: 0\r\nOK\r\n",
        );

        assert!(board.add_service("180D", true));
        assert!(board.add_characteristic(&CharacteristicDefinition {
            uuid: "2A37".into(),
            properties: CharProperties::READ | CharProperties::NOTIFY,
            permissions: AttPermissions::READ | AttPermissions::WRITE,
            max_length: 20,
            variable_length: true,
            value: vec![0],
        }));
        assert!(board.add_descriptor(&DescriptorDefinition {
            uuid: "2902".into(),
            permissions: AttPermissions::READ | AttPermissions::WRITE,
            max_length: 2,
            variable_length: false,
            value: vec![0, 0],
        }));
        assert_eq!(
            board.profile_setup(ProfileSetup::Commit),
            Some(vec![
                ProfileSetupEntry { status: 0, handle: Some(256) },
                ProfileSetupEntry { status: 0, handle: None },
            ])
        );
    }

    #[test]
    fn test_read_request_round() {
        let (mut board, mock) = board();
        mock.enqueue_read("+SRBLEREAD_REQ: 1,300\r\n+SRBLEREAD_REQ: 1,259\r\n");
        assert!(board.wait_for_read_request(1, 259, Duration::from_millis(200)));

        mock.reply_to("AT+SRBLEREADRESP=1,259,1,\"\\41\\42\",0\r", "OK\r\n");
        assert!(board.read_response(1, 259, true, b"AB", 0));
        mock.reply_to("AT+SRBLEREADRESP=1,259,0\r", "OK\r\n");
        assert!(board.read_response(1, 259, false, b"AB", 0));
    }

    #[test]
    fn test_wait_for_write_request() {
        let (mut board, mock) = board();
        mock.enqueue_read("+SRBLEWRITE_REQ: 1,259,4,2,\"\\01\\5C\"\r\n");
        let request = board
            .wait_for_write_request(1, 259, Duration::from_millis(200))
            .unwrap();
        assert_eq!(
            request,
            GattWriteRequest {
                session_id: 1,
                handle: 259,
                offset: 4,
                value: vec![0x01, 0x5C],
                need_rsp: true,
            }
        );
    }

    #[test]
    fn test_notify_and_indicate() {
        let (mut board, mock) = board();
        mock.reply_to("AT+SRBLENOTIFY=1,259,\"\\01\"\r", "OK\r\n");
        mock.reply_to("AT+SRBLEINDICATE=1,259,\"\\02\"\r", "OK\r\n");
        assert!(board.notification_request(1, 259, &[1]));
        assert!(board.indication_request(1, 259, &[2]));
        assert!(board.indication_response(1, 259));
        assert!(board.wait_for_indication_response(1, 259, Duration::from_millis(50)));
        assert!(board.wait_for_notification(1, 259, Duration::ZERO).is_none());
    }

    #[test]
    fn test_bc_smart_server() {
        let (mut board, mock) = board();
        mock.reply_to("AT+SRBCSMARTSEND=1,1,\"\\68\\69\"\r", "OK\r\n");
        assert!(board.server_send_data(1, b"hi"));

        mock.enqueue_read(
            "+SRBCSMARTRECV: 1,0,\"\\01\\02\"\r\n+SRBCSMARTRECV: 2,0,\"\\FF\"\r\n\
             +SRBCSMARTRECV: 1,0,\"\\03\"\r\n+SRREMCMD: \"VOL_UP\"\r\n",
        );
        assert_eq!(
            board.server_wait_for_data(1, Duration::from_millis(80)),
            Some(vec![1, 2, 3])
        );
        assert_eq!(
            board.server_wait_for_command(1, Duration::from_millis(80)),
            Some("VOL_UP".to_string())
        );
        assert_eq!(board.server_wait_for_data(3, Duration::ZERO), None);
    }

    #[test]
    fn test_bc_smart_server_empty_payload() {
        let (mut board, mock) = board();
        mock.enqueue_read("+SRBCSMARTRECV: 1,0,\"\"\r\n");
        assert_eq!(
            board.server_wait_for_data(1, Duration::from_millis(60)),
            Some(vec![])
        );
        assert_eq!(board.server_wait_for_data(2, Duration::ZERO), None);
    }

    #[test]
    fn test_write_request_value_with_literal_quote() {
        let (mut board, mock) = board();
        mock.enqueue_read("+SRBLEWRITE_REQ: 1,259,0,3,\"A\"B\"\r\n");
        let request = board
            .wait_for_write_request(1, 259, Duration::from_millis(200))
            .unwrap();
        assert_eq!(request.value, vec![0x41, 0x22, 0x42]);

        mock.enqueue_read("+SRBCSMARTRECV: 1,0,\"x\"\"\r\n");
        assert_eq!(
            board.server_wait_for_data(1, Duration::from_millis(60)),
            Some(vec![b'x', b'"'])
        );
    }
}
