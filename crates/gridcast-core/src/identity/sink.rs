// Event sink injected into the resolver so callers decide where resolution
// decisions end up (log file, test buffer, report).

use super::{Identity, MatchRule, ResolutionError};
use tracing::{debug, error, info};

/// One resolution decision.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionEvent {
    /// A fresh identity was minted (first sighting or a same-name second athlete).
    Opened {
        name: String,
        team: String,
        year: i32,
        identity: Identity,
        rule: MatchRule,
    },
    /// An existing identity was carried into a new season.
    Linked {
        name: String,
        team: String,
        year: i32,
        identity: Identity,
        rule: MatchRule,
        from_team: String,
        from_year: i32,
    },
    /// The record could not be assigned.
    Unresolved { error: ResolutionError },
}

/// Receiver for resolution events.
pub trait ResolutionSink {
    fn on_event(&mut self, event: ResolutionEvent);
}

impl<S: ResolutionSink + ?Sized> ResolutionSink for &mut S {
    fn on_event(&mut self, event: ResolutionEvent) {
        (**self).on_event(event);
    }
}

/// Collects events in order. Used by tests and by callers that want the full
/// decision trail.
impl ResolutionSink for Vec<ResolutionEvent> {
    fn on_event(&mut self, event: ResolutionEvent) {
        self.push(event);
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ResolutionSink for TracingSink {
    fn on_event(&mut self, event: ResolutionEvent) {
        match event {
            ResolutionEvent::Opened {
                name,
                team,
                year,
                identity,
                rule: MatchRule::Doppelganger,
            } => {
                info!("Creating new player #{identity} for {name} ({team}, {year}): name already taken");
            }
            ResolutionEvent::Opened {
                name,
                team,
                year,
                identity,
                ..
            } => {
                debug!("Created new entry #{identity} for {name} ({team} {year})");
            }
            ResolutionEvent::Linked {
                name,
                team,
                year,
                identity,
                rule,
                from_team,
                from_year,
            } => match rule {
                MatchRule::Traded => info!(
                    "Probable trade of {name} from {from_team} to {team} between {from_year}/{year} (#{identity})"
                ),
                MatchRule::SpecialCaseTrade => info!(
                    "Special-case trade of {name} from {from_team} to {team} between {from_year}/{year} (#{identity})"
                ),
                MatchRule::PositionChange => info!(
                    "{name} probably changed position on {team} from {from_year} to {year} (#{identity})"
                ),
                _ => debug!("Updating {name} ({team}) from {from_year} to {year} (#{identity})"),
            },
            ResolutionEvent::Unresolved { error } => {
                error!("{error}");
            }
        }
    }
}
