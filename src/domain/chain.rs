//! Section chain of a line
//!
//! A line's sections form a single simple path over distinct stations.
//! Storage order is irrelevant: the path order is always derived by walking
//! from the head station along down → up links.
//!
//! ## Adding
//!
//! | Shape | Result |
//! |-------|--------|
//! | empty chain | accepted as the only section |
//! | `new.down` is the first station | prepended |
//! | `new.up` is the last station | appended |
//! | shares an up or down station with an inner section | splits it |
//! | both stations known / neither known | rejected |
//!
//! ## Removing
//!
//! Removing an inner station merges its two neighbouring sections; removing
//! an end station drops the end section. A chain never shrinks below one
//! section.

use std::collections::{HashMap, HashSet};

use petgraph::algo::{connected_components, is_cyclic_directed};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::error::{ChainError, InvalidSectionKind};
use super::id::{LineId, StationId};
use super::section::Section;

/// Effect of a successful chain mutation
#[derive(Debug, Clone, PartialEq)]
pub enum SectionChange {
    /// A new section was stored; `shrunk` is the existing section it split
    Added {
        section: Section,
        shrunk: Option<Section>,
    },
    /// `removed` was dropped; `merged` is the neighbour rewritten to span both
    Removed {
        removed: Section,
        merged: Option<Section>,
    },
}

/// The ordered collection of a line's sections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    /// Creates an empty chain
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Assembles a chain from stored sections, verifying the path invariant
    pub fn from_sections(sections: Vec<Section>) -> Result<Self, ChainError> {
        let chain = Self { sections };
        chain.verify()?;
        Ok(chain)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Iterates sections in storage order
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Returns the line the chain's sections are registered to
    pub fn line(&self) -> Option<LineId> {
        self.sections.iter().find_map(|s| s.line())
    }

    /// Returns true if any section touches the station
    pub fn contains_station(&self, station: StationId) -> bool {
        self.sections.iter().any(|s| s.touches(station))
    }

    /// Section whose up station is nobody's down station
    fn head(&self) -> Option<&Section> {
        let downs: HashSet<StationId> = self.sections.iter().map(|s| s.down_station()).collect();
        self.sections
            .iter()
            .find(|s| !downs.contains(&s.up_station()))
    }

    /// Section whose down station is nobody's up station
    fn tail(&self) -> Option<&Section> {
        let ups: HashSet<StationId> = self.sections.iter().map(|s| s.up_station()).collect();
        self.sections
            .iter()
            .find(|s| !ups.contains(&s.down_station()))
    }

    pub fn first_station(&self) -> Option<StationId> {
        self.head().map(|s| s.up_station())
    }

    pub fn last_station(&self) -> Option<StationId> {
        self.tail().map(|s| s.down_station())
    }

    /// Walks the stations from first to last
    ///
    /// The iterator is a pure function of the current chain, so calling
    /// this again yields the same sequence.
    pub fn ordered_stations(&self) -> OrderedStations<'_> {
        let by_up = self
            .sections
            .iter()
            .map(|s| (s.up_station(), s))
            .collect();

        OrderedStations {
            by_up,
            next: self.first_station(),
            remaining: self.sections.len() + 1,
        }
    }

    /// Returns sections in path order
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let by_up: HashMap<StationId, &Section> = self
            .sections
            .iter()
            .map(|s| (s.up_station(), s))
            .collect();

        let mut ordered = Vec::with_capacity(self.sections.len());
        let mut current = self.head();
        while let Some(section) = current {
            if ordered.len() == self.sections.len() {
                break;
            }
            ordered.push(section);
            current = by_up.get(&section.down_station()).copied();
        }
        ordered
    }

    /// Sum of all section distances
    pub fn total_distance(&self) -> u64 {
        self.sections.iter().map(|s| u64::from(s.distance())).sum()
    }

    /// Adds a section to the chain
    ///
    /// On error the chain is left exactly as it was.
    pub fn add(&mut self, section: Section) -> Result<SectionChange, ChainError> {
        if let (Some(chain_line), Some(section_line)) = (self.line(), section.line()) {
            if chain_line != section_line {
                return Err(ChainError::AlreadyRegistered {
                    registered: section_line,
                    requested: chain_line,
                });
            }
        }

        if self.sections.is_empty() {
            self.sections.push(section.clone());
            return Ok(SectionChange::Added {
                section,
                shrunk: None,
            });
        }

        let up_known = self.contains_station(section.up_station());
        let down_known = self.contains_station(section.down_station());

        if up_known && down_known {
            return Err(InvalidSectionKind::StationsAlreadyRegistered.into());
        }
        if !up_known && !down_known {
            return Err(InvalidSectionKind::StationsNotConnected.into());
        }

        if self.first_station() == Some(section.down_station()) {
            self.sections.insert(0, section.clone());
            return Ok(SectionChange::Added {
                section,
                shrunk: None,
            });
        }

        if self.last_station() == Some(section.up_station()) {
            self.sections.push(section.clone());
            return Ok(SectionChange::Added {
                section,
                shrunk: None,
            });
        }

        if up_known {
            // Insert after the shared up station: host now starts at new.down
            let index = self.position(|s| s.up_station() == section.up_station())?;
            let host = &mut self.sections[index];
            Self::check_fits(&section, host)?;
            host.shrink_from_up(section.down_station(), section.distance());
            let shrunk = host.clone();
            self.sections.insert(index, section.clone());

            return Ok(SectionChange::Added {
                section,
                shrunk: Some(shrunk),
            });
        }

        // Insert before the shared down station: host now ends at new.up
        let index = self.position(|s| s.down_station() == section.down_station())?;
        let host = &mut self.sections[index];
        Self::check_fits(&section, host)?;
        host.shrink_from_down(section.up_station(), section.distance());
        let shrunk = host.clone();
        self.sections.insert(index + 1, section.clone());

        Ok(SectionChange::Added {
            section,
            shrunk: Some(shrunk),
        })
    }

    /// Removes a station from the chain
    ///
    /// On error the chain is left exactly as it was.
    pub fn remove(&mut self, station: StationId) -> Result<SectionChange, ChainError> {
        if self.sections.len() < 2 {
            return Err(ChainError::CannotRemove(self.sections.len()));
        }

        let before = self.sections.iter().position(|s| s.down_station() == station);
        let after = self.sections.iter().position(|s| s.up_station() == station);

        match (before, after) {
            (Some(before), Some(after)) => {
                let next = self.sections[after].clone();
                self.sections[before].absorb(&next)?;
                let merged = self.sections[before].clone();
                self.sections.remove(after);

                Ok(SectionChange::Removed {
                    removed: next,
                    merged: Some(merged),
                })
            }
            (None, Some(first)) => Ok(SectionChange::Removed {
                removed: self.sections.remove(first),
                merged: None,
            }),
            (Some(last), None) => Ok(SectionChange::Removed {
                removed: self.sections.remove(last),
                merged: None,
            }),
            (None, None) => Err(ChainError::StationNotInLine(station)),
        }
    }

    /// Checks the full path invariant
    ///
    /// Every station has at most one incoming and one outgoing section,
    /// the sections are acyclic and connected, and all belong to one line.
    pub fn verify(&self) -> Result<(), ChainError> {
        if self.sections.is_empty() {
            return Ok(());
        }

        let lines: HashSet<Option<LineId>> = self.sections.iter().map(|s| s.line()).collect();
        if lines.len() > 1 {
            return Err(ChainError::CorruptChain(
                "sections belong to different lines".to_string(),
            ));
        }

        let mut graph: DiGraph<StationId, u32> = DiGraph::new();
        let mut nodes: HashMap<StationId, NodeIndex> = HashMap::new();

        for section in &self.sections {
            if section.up_station() == section.down_station() || section.distance() == 0 {
                return Err(ChainError::CorruptChain(format!(
                    "malformed section {} -> {}",
                    section.up_station(),
                    section.down_station()
                )));
            }

            let up = *nodes
                .entry(section.up_station())
                .or_insert_with(|| graph.add_node(section.up_station()));
            let down = *nodes
                .entry(section.down_station())
                .or_insert_with(|| graph.add_node(section.down_station()));
            graph.add_edge(up, down, section.distance());
        }

        for idx in graph.node_indices() {
            if graph.neighbors_directed(idx, Direction::Incoming).count() > 1 {
                return Err(ChainError::CorruptChain(format!(
                    "station {} has more than one incoming section",
                    graph[idx]
                )));
            }
            if graph.neighbors_directed(idx, Direction::Outgoing).count() > 1 {
                return Err(ChainError::CorruptChain(format!(
                    "station {} has more than one outgoing section",
                    graph[idx]
                )));
            }
        }

        if is_cyclic_directed(&graph) {
            return Err(ChainError::CorruptChain("sections form a cycle".to_string()));
        }

        if connected_components(&graph) != 1 {
            return Err(ChainError::CorruptChain(
                "sections are not connected".to_string(),
            ));
        }

        Ok(())
    }

    fn position(&self, predicate: impl Fn(&Section) -> bool) -> Result<usize, ChainError> {
        self.sections.iter().position(predicate).ok_or_else(|| {
            ChainError::CorruptChain("no section to split at the shared station".to_string())
        })
    }

    fn check_fits(section: &Section, host: &Section) -> Result<(), ChainError> {
        if section.distance() >= host.distance() {
            return Err(ChainError::DistanceTooLong {
                distance: section.distance(),
                existing: host.distance(),
            });
        }
        Ok(())
    }
}

/// Stations of a chain in path order
pub struct OrderedStations<'a> {
    by_up: HashMap<StationId, &'a Section>,
    next: Option<StationId>,
    remaining: usize,
}

impl Iterator for OrderedStations<'_> {
    type Item = StationId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = self.by_up.get(&current).map(|s| s.down_station());
        Some(current)
    }
}
