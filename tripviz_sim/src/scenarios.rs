//! Named simulation scenarios.

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// Loads once and loops; every frame is checked against the oracle
    SteadyLoop,

    /// Swaps the trips dataset mid-run
    Reload,

    /// Initial and later fetches fail; the loop keeps running
    FetchFailure,

    /// A share of the trip records is corrupted
    MalformedRecords,

    /// Stops the viewer while loads are still in flight
    Teardown,

    /// Irregular display refresh intervals
    FrameJitter,

    /// Datasets arrive several seconds after start-up
    SlowSource,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::SteadyLoop,
            ScenarioId::Reload,
            ScenarioId::FetchFailure,
            ScenarioId::MalformedRecords,
            ScenarioId::Teardown,
            ScenarioId::FrameJitter,
            ScenarioId::SlowSource,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::SteadyLoop => "steady_loop",
            ScenarioId::Reload => "reload",
            ScenarioId::FetchFailure => "fetch_failure",
            ScenarioId::MalformedRecords => "malformed_records",
            ScenarioId::Teardown => "teardown",
            ScenarioId::FrameJitter => "frame_jitter",
            ScenarioId::SlowSource => "slow_source",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::SteadyLoop => "Load once, loop through several cycles, match every frame to ground truth",
            ScenarioId::Reload => "Replace the trips dataset mid-run, verify the new index takes over",
            ScenarioId::FetchFailure => "Failed fetches leave the previous index in place and frames keep coming",
            ScenarioId::MalformedRecords => "Corrupt 10% of trips, verify they are skipped without shifting ids",
            ScenarioId::Teardown => "Stop with loads in flight, verify no frame or install happens afterwards",
            ScenarioId::FrameJitter => "0-50ms refresh jitter, verify logical time tracks the wall clock",
            ScenarioId::SlowSource => "3s dataset latency, verify frames render empty layers until it lands",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "steady_loop" | "steadyloop" => Ok(ScenarioId::SteadyLoop),
            "reload" => Ok(ScenarioId::Reload),
            "fetch_failure" | "fetchfailure" => Ok(ScenarioId::FetchFailure),
            "malformed_records" | "malformed" => Ok(ScenarioId::MalformedRecords),
            "teardown" => Ok(ScenarioId::Teardown),
            "frame_jitter" | "jitter" => Ok(ScenarioId::FrameJitter),
            "slow_source" | "slowsource" => Ok(ScenarioId::SlowSource),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
            assert_eq!(scenario.to_string(), scenario.name());
            assert!(!scenario.description().is_empty());
        }
    }

    #[test]
    fn test_aliases_and_case() {
        assert_eq!("JITTER".parse::<ScenarioId>(), Ok(ScenarioId::FrameJitter));
        assert_eq!("malformed".parse::<ScenarioId>(), Ok(ScenarioId::MalformedRecords));
        assert!("split_brain".parse::<ScenarioId>().is_err());
    }
}
