//! Built-in BastardKB release catalog
//!
//! The firmwares published with every release when no matrix file is given.

use super::firmware::{BuildMatrix, FirmwareBatch, FirmwareSpec};

/// Branch tracking `qmk/qmk_firmware:master`
pub const MASTER_BRANCH: &str = "bkb-master";

pub const DACMAN_KEYBOARD_FAMILY: &[&str] = &["skeletyl", "tbkmini", "scylla"];

pub const CHARYBDIS_KEYBOARD_FAMILY: &[&str] = &["charybdis/3x5", "charybdis/3x6", "charybdis/4x6"];

pub const AVR_MCUS: &[&str] = &["v1/elitec", "v2/elitec"];

pub const ARM_MCUS: &[&str] = &["blackpill", "v2/stemcell", "v2/splinky_2", "v2/splinky_3"];

const MIRYOKU_ENV: &[&str] = &["MIRYOKU_ALPHAS=QWERTY", "MIRYOKU_EXTRA=COLEMAKDH"];

fn all_mcus() -> impl Iterator<Item = &'static str> + Clone {
    AVR_MCUS.iter().chain(ARM_MCUS.iter()).copied()
}

/// The default release matrix
pub fn bastardkb_release() -> BuildMatrix {
    let mut firmwares = Vec::new();

    // The Dactyl-Manuform boards have no `via` keymap; their stock firmware
    // is `default` with VIA switched on.
    for keyboard in DACMAN_KEYBOARD_FAMILY {
        for mcu in all_mcus() {
            firmwares.push(
                FirmwareSpec::new(format!("{keyboard}/{mcu}"), "default")
                    .alias("stock")
                    .env(["VIA_ENABLE=yes"]),
            );
        }
    }

    // The Charybdis `default` keymap is bare, stock is `via`.
    for keyboard in CHARYBDIS_KEYBOARD_FAMILY {
        for mcu in all_mcus() {
            firmwares.push(FirmwareSpec::new(format!("{keyboard}/{mcu}"), "via").alias("stock"));
        }
    }

    // Blackpill firmwares again, in uf2 format.
    for keyboard in DACMAN_KEYBOARD_FAMILY {
        firmwares.push(
            FirmwareSpec::new(format!("{keyboard}/blackpill"), "default")
                .alias("stock")
                .env(["BOOTLOADER=tinyuf2", "VIA_ENABLE=yes"]),
        );
    }
    for keyboard in CHARYBDIS_KEYBOARD_FAMILY {
        firmwares.push(
            FirmwareSpec::new(format!("{keyboard}/blackpill"), "via")
                .alias("stock")
                .env(["BOOTLOADER=tinyuf2"]),
        );
    }

    for mcu in all_mcus() {
        firmwares.push(
            FirmwareSpec::new(format!("skeletyl/{mcu}"), "manna-harbour_miryoku")
                .alias("miryoku")
                .env(MIRYOKU_ENV.iter().copied()),
        );
    }
    firmwares.push(
        FirmwareSpec::new("skeletyl/blackpill", "manna-harbour_miryoku")
            .alias("miryoku")
            .env(["BOOTLOADER=tinyuf2"])
            .env(MIRYOKU_ENV.iter().copied()),
    );

    firmwares.push(FirmwareSpec::new("dilemma/3x5_2/assembled", "via").alias("stock"));
    firmwares.push(FirmwareSpec::new("dilemma/3x5_2/splinky", "via").alias("stock"));

    BuildMatrix::new(vec![FirmwareBatch::new(MASTER_BRANCH, firmwares)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_release_size() {
        let matrix = bastardkb_release();
        assert_eq!(matrix.batches.len(), 1);
        assert_eq!(matrix.batches[0].branch, MASTER_BRANCH);
        assert_eq!(matrix.total_firmwares(), 51);
    }

    #[test]
    fn test_uf2_variants_collide_with_regular_blackpill_names() {
        // The uf2 build reuses the artifact base name; only the extension
        // differs, so names are unique per (base, extension) and not per base.
        let matrix = bastardkb_release();
        let names: Vec<_> = matrix.iter().map(|(_, f)| f.artifact_base_name()).collect();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(names.len() - unique.len(), 7);
    }

    #[test]
    fn test_miryoku_blackpill_env_order() {
        let matrix = bastardkb_release();
        let spec = matrix
            .iter()
            .map(|(_, f)| f)
            .filter(|f| f.keyboard == "skeletyl/blackpill" && f.keymap_alias.as_deref() == Some("miryoku"))
            .last()
            .unwrap();
        assert_eq!(
            spec.env,
            vec!["BOOTLOADER=tinyuf2", "MIRYOKU_ALPHAS=QWERTY", "MIRYOKU_EXTRA=COLEMAKDH"]
        );
    }

    #[test]
    fn test_stock_charybdis_uses_via() {
        let matrix = bastardkb_release();
        let spec = matrix
            .iter()
            .map(|(_, f)| f)
            .find(|f| f.keyboard == "charybdis/4x6/v2/splinky_3")
            .unwrap();
        assert_eq!(spec.keymap, "via");
        assert_eq!(spec.artifact_base_name(), "bastardkb_charybdis_4x6_v2_splinky_3_stock");
        assert!(spec.env.is_empty());
    }
}
