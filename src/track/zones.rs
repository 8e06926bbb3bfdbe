/// One heart-rate training zone: `min <= hr < max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HrZone {
    /// Zone number, 1 to 5.
    pub number: u8,
    /// Inclusive lower bound in bpm.
    pub min: u16,
    /// Exclusive upper bound in bpm.
    pub max: u16,
    /// Short display name.
    pub name: &'static str,
    /// Training intent.
    pub description: &'static str,
}

/// Five age-derived zones.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HrZones {
    zones: [HrZone; 5],
}

/// Ceiling of the top zone; rates at or above it still classify as zone 5.
const TOP_ZONE_CEILING: u16 = 300;

impl HrZones {
    /// Zones from the `220 - age` maximum-heart-rate estimate, split at 60/70/80/90 %.
    pub fn for_age(age: u32) -> Self {
        let max_hr = 220u32.saturating_sub(age) as f64;
        let at = |f: f64| (max_hr * f) as u16;
        let (z2, z3, z4, z5) = (at(0.60), at(0.70), at(0.80), at(0.90));
        Self {
            zones: [
                HrZone {
                    number: 1,
                    min: 0,
                    max: z2,
                    name: "ZONE 1",
                    description: "Recovery",
                },
                HrZone {
                    number: 2,
                    min: z2,
                    max: z3,
                    name: "ZONE 2",
                    description: "Endurance",
                },
                HrZone {
                    number: 3,
                    min: z3,
                    max: z4,
                    name: "ZONE 3",
                    description: "Tempo",
                },
                HrZone {
                    number: 4,
                    min: z4,
                    max: z5,
                    name: "ZONE 4",
                    description: "Threshold",
                },
                HrZone {
                    number: 5,
                    min: z5,
                    max: TOP_ZONE_CEILING,
                    name: "ZONE 5",
                    description: "VO2 Max",
                },
            ],
        }
    }

    /// All five zones, zone 1 first.
    pub fn zones(&self) -> &[HrZone; 5] {
        &self.zones
    }

    /// Zone containing `hr`. Absent or zero heart rate has no zone.
    pub fn classify(&self, hr: Option<u16>) -> Option<&HrZone> {
        let hr = hr.filter(|&v| v > 0)?;
        self.zones
            .iter()
            .find(|z| z.min <= hr && hr < z.max)
            .or(Some(&self.zones[4]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/track/zones.rs"]
mod tests;
