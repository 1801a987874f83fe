// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::str::FromStr;

/// The fixed set of playback rates offered by the speed button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    Half,
    #[default]
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackSpeed {
    /// All speeds in cycling order
    pub const ALL: [PlaybackSpeed; 4] = [
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::OneAndHalf,
        PlaybackSpeed::Double,
    ];

    /// Playback rate multiplier
    pub fn rate(self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::OneAndHalf => 1.5,
            PlaybackSpeed::Double => 2.0,
        }
    }

    /// The speed after this one: 0.5 → 1 → 1.5 → 2 → 0.5
    pub fn next(self) -> Self {
        match self {
            PlaybackSpeed::Half => PlaybackSpeed::Normal,
            PlaybackSpeed::Normal => PlaybackSpeed::OneAndHalf,
            PlaybackSpeed::OneAndHalf => PlaybackSpeed::Double,
            PlaybackSpeed::Double => PlaybackSpeed::Half,
        }
    }

    /// Look up the speed for an exact rate
    pub fn from_rate(rate: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|speed| speed.rate() == rate)
    }

    /// Button label, e.g. `1.5X`
    pub fn label(self) -> String {
        format!("{self}X")
    }
}

impl fmt::Display for PlaybackSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackSpeed::Half => write!(f, "0.5"),
            PlaybackSpeed::Normal => write!(f, "1"),
            PlaybackSpeed::OneAndHalf => write!(f, "1.5"),
            PlaybackSpeed::Double => write!(f, "2"),
        }
    }
}

impl FromStr for PlaybackSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rate: f64 = s
            .trim()
            .trim_end_matches(['x', 'X'])
            .parse()
            .map_err(|_| format!("'{s}' is not a number"))?;

        Self::from_rate(rate)
            .ok_or_else(|| format!("unsupported speed {s}, expected 0.5, 1, 1.5 or 2"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_all_speeds() {
        let mut speed = PlaybackSpeed::Half;
        let mut seen = vec![speed];
        for _ in 0..4 {
            speed = speed.next();
            seen.push(speed);
        }

        assert_eq!(
            seen,
            vec![
                PlaybackSpeed::Half,
                PlaybackSpeed::Normal,
                PlaybackSpeed::OneAndHalf,
                PlaybackSpeed::Double,
                PlaybackSpeed::Half,
            ]
        );
    }

    #[test]
    fn from_rate_only_knows_the_fixed_set() {
        assert_eq!(PlaybackSpeed::from_rate(1.5), Some(PlaybackSpeed::OneAndHalf));
        assert_eq!(PlaybackSpeed::from_rate(1.25), None);
        assert_eq!(PlaybackSpeed::from_rate(0.0), None);
    }

    #[test]
    fn labels_match_button_text() {
        assert_eq!(PlaybackSpeed::Half.label(), "0.5X");
        assert_eq!(PlaybackSpeed::Normal.label(), "1X");
        assert_eq!(PlaybackSpeed::OneAndHalf.label(), "1.5X");
        assert_eq!(PlaybackSpeed::Double.label(), "2X");
    }

    #[test]
    fn parses_from_cli_input() {
        assert_eq!("1.5".parse::<PlaybackSpeed>().unwrap(), PlaybackSpeed::OneAndHalf);
        assert_eq!("2x".parse::<PlaybackSpeed>().unwrap(), PlaybackSpeed::Double);
        assert!("1.25".parse::<PlaybackSpeed>().is_err());
        assert!("fast".parse::<PlaybackSpeed>().is_err());
    }
}
