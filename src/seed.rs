// src/seed.rs

use chrono::NaiveDateTime;

use crate::data_types::{Hardware, KeyInput, MacAddress};
use crate::datetime_codes;
use crate::errors::AssembleError;
use crate::message::MessageTemplate;
use crate::rom_profiles::RomProfile;
use crate::sha1;

/// Messages assembled per SHA-1 dispatch in the batched path.
pub const BATCH_WIDTH: usize = 64;

/// Everything produced for one `(Timer0, VCount, datetime)` tick.
#[derive(Debug, Clone)]
pub struct SeedComputation {
    pub seed: u32,
    pub digest: [u32; 5],
    pub message: [u32; 16],
}

/// Assembler + hash front door. Holds the precomputed message template for
/// one set of fixed search parameters.
pub struct SeedCalculator {
    template: MessageTemplate,
    hardware: Hardware,
}

impl SeedCalculator {
    pub fn new(
        profile: &RomProfile,
        hardware: Hardware,
        mac: MacAddress,
        key_input: KeyInput,
        frame: u32,
    ) -> Self {
        SeedCalculator {
            template: MessageTemplate::new(profile, mac, key_input, frame),
            hardware,
        }
    }

    pub fn template(&self) -> &MessageTemplate {
        &self.template
    }

    /// Single-tick seed with the full digest and message for auditing.
    pub fn seed_at(
        &self,
        timer0: u16,
        vcount: u8,
        datetime: NaiveDateTime,
    ) -> Result<SeedComputation, AssembleError> {
        let (date_code, time_code) = datetime_codes::codes_for(datetime, self.hardware)?;
        let message = self.template.fill(timer0, vcount, date_code, time_code);
        let digest = sha1::compress(&message);
        Ok(SeedComputation {
            seed: digest[0],
            digest,
            message,
        })
    }

    /// Batched variant: assemble every triple back-to-back into one buffer,
    /// dispatch to the lane-parallel core, return `(seed, digest_hex)` pairs
    /// in input order. Fails on the first unrepresentable datetime; callers
    /// that need skip-and-continue semantics drive the template directly.
    pub fn seed_batch(
        &self,
        triples: &[(u16, u8, NaiveDateTime)],
    ) -> Result<Vec<(u32, String)>, AssembleError> {
        let mut words = Vec::with_capacity(triples.len().min(BATCH_WIDTH) * 16);
        let mut out = Vec::with_capacity(triples.len());
        for block in triples.chunks(BATCH_WIDTH) {
            words.clear();
            for &(timer0, vcount, datetime) in block {
                let (date_code, time_code) =
                    datetime_codes::codes_for(datetime, self.hardware)?;
                words.extend_from_slice(&self.template.fill(timer0, vcount, date_code, time_code));
            }
            for digest in sha1::compress_batch(&words) {
                out.push((digest[0], sha1::digest_hex(&digest)));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime_codes::datetime_from_parts;
    use crate::rom_profiles::{self, RomRegion, RomVersion};

    fn calculator() -> SeedCalculator {
        let profile = rom_profiles::profile(RomVersion::Black, RomRegion::Jpn).unwrap();
        let mac = MacAddress::parse("00:09:BF:12:34:56").unwrap();
        SeedCalculator::new(profile, Hardware::Ds, mac, KeyInput::NONE, 0)
    }

    #[test]
    fn batch_agrees_with_singles() {
        let calc = calculator();
        let base = datetime_from_parts(2011, 3, 6, 11, 59, 55).unwrap();
        let mut triples = Vec::new();
        for offset in 0..70i64 {
            let dt = base + chrono::Duration::seconds(offset);
            for timer0 in [0x0C79u16, 0x0C7A] {
                triples.push((timer0, 0x60u8, dt));
            }
        }
        let batched = calc.seed_batch(&triples).unwrap();
        assert_eq!(batched.len(), triples.len());
        for (i, &(timer0, vcount, dt)) in triples.iter().enumerate() {
            let single = calc.seed_at(timer0, vcount, dt).unwrap();
            assert_eq!(batched[i].0, single.seed);
            assert_eq!(batched[i].1, crate::sha1::digest_hex(&single.digest));
        }
    }

    #[test]
    fn batch_rejects_out_of_window_tick() {
        let calc = calculator();
        let dt = chrono::NaiveDate::from_ymd_opt(1999, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(calc.seed_batch(&[(0x0C79, 0x60, dt)]).is_err());
    }
}
