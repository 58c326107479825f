//! BLE service invocation
//!
//! Registers the bridge data service with the SoftDevice: a 20-byte
//! read/notify telemetry characteristic and a 20-byte write command
//! characteristic under the 16-bit service UUID 0xF005, which is also
//! carried in the advertising payload. All protocol logic lives in
//! `bitlink-core`; this module only moves bytes.

use defmt::{info, unwrap, warn};
use heapless::{String, Vec};
use nrf_softdevice::ble::peripheral;
use nrf_softdevice::{raw, Softdevice};

use bitlink_protocol::TELEMETRY_FRAME_SIZE;

use crate::channels::COMMAND_FRAMES;

/// Advertised device name prefix; a per-device hex suffix is appended
const NAME_PREFIX: &str = "bitlink";

/// Maximum advertised name length
pub const MAX_NAME_LEN: usize = 16;

/// The bridge data service
#[nrf_softdevice::gatt_service(uuid = "f005")]
pub struct BridgeDataService {
    /// Telemetry frames, pushed by notify every telemetry period
    #[characteristic(uuid = "5261da01-fa7e-42ab-850b-7c80220097cc", read, notify)]
    pub telemetry: [u8; TELEMETRY_FRAME_SIZE],

    /// Inbound command frames from the host
    #[characteristic(uuid = "5261da02-fa7e-42ab-850b-7c80220097cc", write, write_without_response)]
    pub command: Vec<u8, TELEMETRY_FRAME_SIZE>,
}

/// GATT server holding the bridge service
#[nrf_softdevice::gatt_server]
pub struct Server {
    pub bridge: BridgeDataService,
}

impl Server {
    /// Forward a characteristic write to the command dispatch task
    pub fn on_bridge_event(&self, event: BridgeDataServiceEvent) {
        match event {
            BridgeDataServiceEvent::CommandWrite(frame) => {
                if COMMAND_FRAMES.try_send(frame).is_err() {
                    warn!("Command channel full, dropping frame");
                }
            }
            BridgeDataServiceEvent::TelemetryCccdWrite { notifications } => {
                info!("Telemetry notifications {}", notifications);
            }
        }
    }
}

/// SoftDevice configuration for a single-peripheral link
pub fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        ..Default::default()
    }
}

/// Per-device friendly name: prefix plus four hex digits from the
/// factory device identifier
pub fn device_name() -> String<MAX_NAME_LEN> {
    // FICR device identifier survives reflashes, so the name is stable
    let device_id = embassy_nrf::pac::FICR.deviceid(0).read();
    let mut name = String::new();
    let _ = name.push_str(NAME_PREFIX);
    let _ = name.push('-');
    for shift in [12u32, 8, 4, 0] {
        let nibble = (device_id >> shift & 0xF) as u8;
        let digit = char::from_digit(u32::from(nibble), 16).unwrap_or('0');
        let _ = name.push(digit.to_ascii_uppercase());
    }
    name
}

/// Build the advertising payload: flags, the 16-bit service UUID list,
/// and the complete local name
pub fn advertising_data(name: &str) -> Vec<u8, 31> {
    let mut adv = Vec::new();
    let _ = adv.extend_from_slice(&[
        2,
        raw::BLE_GAP_AD_TYPE_FLAGS as u8,
        raw::BLE_GAP_ADV_FLAG_BR_EDR_NOT_SUPPORTED as u8
            | raw::BLE_GAP_ADV_FLAG_LE_GENERAL_DISC_MODE as u8,
        3,
        raw::BLE_GAP_AD_TYPE_16BIT_SERVICE_UUID_COMPLETE as u8,
        0x05,
        0xF0,
    ]);
    let name_bytes = name.as_bytes();
    let _ = adv.push(name_bytes.len() as u8 + 1);
    let _ = adv.push(raw::BLE_GAP_AD_TYPE_COMPLETE_LOCAL_NAME as u8);
    let _ = adv.extend_from_slice(name_bytes);
    adv
}

/// Advertise until a central connects
pub async fn advertise(
    sd: &Softdevice,
    adv_data: &[u8],
) -> Result<nrf_softdevice::ble::Connection, peripheral::AdvertiseError> {
    let config = peripheral::Config::default();
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data,
        scan_data: &[],
    };
    peripheral::advertise_connectable(sd, adv, &config).await
}

/// SoftDevice runner task
#[embassy_executor::task]
pub async fn softdevice_task(sd: &'static Softdevice) -> ! {
    info!("SoftDevice task started");
    sd.run().await
}

/// Enable the SoftDevice and register the GATT server
pub fn init(spawner: &embassy_executor::Spawner) -> (&'static Softdevice, &'static Server) {
    let sd = Softdevice::enable(&softdevice_config());
    let server = unwrap!(Server::new(sd));

    static SERVER: static_cell::StaticCell<Server> = static_cell::StaticCell::new();
    let server = SERVER.init(server);

    unwrap!(spawner.spawn(softdevice_task(sd)));

    (sd, server)
}
