//! Build script for fancontroller-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Parses and validates controller.toml, then emits it as Rust constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fancontroller_core::config::ControlConfig;
use serde::Deserialize;

/// Lowest and highest supported fan PWM frequency (Hz)
///
/// The lower end keeps the counter top within 16 bits at divider 1.
const PWM_FREQUENCY_RANGE: (u32, u32) = (2_000, 100_000);

/// RP2040 system clock driving the PWM slices (Hz)
const SYS_CLOCK_HZ: u32 = 125_000_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FirmwareToml {
    #[serde(default)]
    control: ControlConfig,
    #[serde(default)]
    board: BoardToml,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BoardToml {
    baud_rate: u32,
    pwm_frequency_hz: u32,
    led_inverted: bool,
}

impl Default for BoardToml {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            pwm_frequency_hz: 25_000,
            led_inverted: false,
        }
    }
}

fn main() {
    setup_linker();
    let config = load_config();
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}

/// Read, parse and validate controller.toml
fn load_config() -> FirmwareToml {
    println!("cargo:rerun-if-changed=controller.toml");

    let config_path = Path::new("controller.toml");

    if !config_path.exists() {
        fail(
            "controller.toml not found!",
            &["The firmware requires a controller.toml configuration file.".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read controller.toml", &[e.to_string()]),
    };

    let config: FirmwareToml = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid controller.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    if let Err(e) = config.control.validate() {
        errors.push(format!("[control] {}", e));
    }

    let (min_hz, max_hz) = PWM_FREQUENCY_RANGE;
    if !(min_hz..=max_hz).contains(&config.board.pwm_frequency_hz) {
        errors.push(format!(
            "[board] pwm_frequency_hz must be {}..={}, got {}",
            min_hz, max_hz, config.board.pwm_frequency_hz
        ));
    }

    if config.board.baud_rate == 0 {
        errors.push("[board] baud_rate must be non-zero".to_string());
    }

    if !errors.is_empty() {
        fail("Invalid values in controller.toml", &errors);
    }

    println!("cargo:warning=controller.toml validated successfully");
    config
}

/// Write `controller_config.rs` into OUT_DIR
fn generate_config(config: &FirmwareToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let control = &config.control;
    let thresholds = &control.thresholds;
    let board = &config.board;

    // Divider 1: the counter wraps at top + 1
    let pwm_top = SYS_CLOCK_HZ / board.pwm_frequency_hz - 1;

    let generated = format!(
        "// Generated from controller.toml by build.rs\n\
         \n\
         /// Controller configuration\n\
         pub const CONTROL_CONFIG: ControlConfig = ControlConfig {{\n\
         \x20   thresholds: Thresholds {{\n\
         \x20       supply_on_c: {},\n\
         \x20       average_cutoff_c: {},\n\
         \x20       single_cutoff_c: {},\n\
         \x20   }},\n\
         \x20   speed_increase: {},\n\
         \x20   duty_min: {},\n\
         \x20   duty_max: {},\n\
         \x20   begin_test_on_telemetry: {},\n\
         \x20   finish_cooldown_when_idle: {},\n\
         }};\n\
         \n\
         /// Telemetry UART baud rate\n\
         pub const BAUD_RATE: u32 = {};\n\
         \n\
         /// PWM counter top for the configured fan frequency\n\
         pub const PWM_TOP: u16 = {};\n\
         \n\
         /// Status LED is active-low\n\
         pub const LED_INVERTED: bool = {};\n",
        thresholds.supply_on_c,
        thresholds.average_cutoff_c,
        thresholds.single_cutoff_c,
        control.speed_increase,
        control.duty_min,
        control.duty_max,
        control.begin_test_on_telemetry,
        control.finish_cooldown_when_idle,
        board.baud_rate,
        pwm_top,
        board.led_inverted,
    );

    fs::write(out_dir.join("controller_config.rs"), generated).unwrap();
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
