use std::cmp::Reverse;

use super::core::{Zone, ZonePlan};
use super::template::{StyleTemplate, ZoneSpec};
use crate::catalog::{Category, ModuleCatalog};
use crate::elastic::{Segment, water_fill};
use crate::error::{LayoutError, Result};
use crate::geometry::{Interval, Room, WallId};

/// Maximal free span of one wall.
#[derive(Debug, Clone)]
struct Run {
    wall: WallId,
    span: Interval,
}

/// Catalog-derived sizing bounds for one template entry.
#[derive(Debug, Clone, Copy)]
struct Sizing {
    primary: Category,
    /// Smallest span the zone can be given.
    base: f64,
    /// Largest span the zone's modules can possibly occupy.
    cap: f64,
    /// Whether any permitted module can stretch.
    elastic: bool,
    /// Narrowest rigid module; the increment rigid zones grow by.
    step: f64,
}

/// Projects a style template onto the free runs of a room.
#[derive(Debug, Clone, Copy)]
pub struct ZonePlanner<'a> {
    catalog: &'a ModuleCatalog,
    max_modules: usize,
    tolerance: f64,
}

impl<'a> ZonePlanner<'a> {
    pub fn new(catalog: &'a ModuleCatalog, max_modules: usize, tolerance: f64) -> Self {
        Self {
            catalog,
            max_modules: max_modules.max(1),
            tolerance,
        }
    }

    pub fn plan(&self, room: &Room, template: &StyleTemplate) -> Result<ZonePlan> {
        room.validate()?;
        self.catalog.validate()?;
        template.validate()?;
        for spec in &template.zones {
            if let Some(wall) = &spec.wall {
                if room.wall(wall).is_none() {
                    return Err(LayoutError::InvalidTemplate(format!(
                        "zone `{}` is pinned to unknown wall `{wall}`",
                        spec.name
                    )));
                }
            }
        }

        let runs: Vec<Run> = room
            .walls
            .iter()
            .flat_map(|wall| {
                wall.free_runs().into_iter().map(|span| Run {
                    wall: wall.id.clone(),
                    span,
                })
            })
            .collect();

        let sizing: Vec<Option<Sizing>> = template.zones.iter().map(|s| self.sizing(s)).collect();

        let mut dropped = Vec::new();
        let mut active = Vec::new();
        for (idx, spec) in template.zones.iter().enumerate() {
            match sizing[idx] {
                Some(_) => active.push(idx),
                None if !spec.required => dropped.push(idx),
                None => {
                    let (wall, span) = widest_eligible(spec, &runs, &vec![0.0; runs.len()], room);
                    return Err(LayoutError::ZoneInfeasible {
                        wall,
                        zone: Some(spec.name.clone()),
                        category: spec.primary(),
                        span,
                        required: f64::INFINITY,
                    });
                }
            }
        }

        let per_run = loop {
            match self.assign(&runs, template, &sizing, &active, room) {
                Ok((per_run, skipped)) => {
                    dropped.extend(skipped);
                    break per_run;
                }
                Err(failure) => {
                    let victim = active
                        .iter()
                        .copied()
                        .filter(|&i| !template.zones[i].required)
                        .min_by(|&a, &b| {
                            template.zones[a]
                                .weight
                                .total_cmp(&template.zones[b].weight)
                                .then(Reverse(a).cmp(&Reverse(b)))
                        });
                    match victim {
                        Some(victim) => {
                            active.retain(|&i| i != victim);
                            dropped.push(victim);
                        }
                        None => return Err(failure),
                    }
                }
            }
        };

        let mut zones = Vec::new();
        let mut unused_runs = Vec::new();
        for (run, members) in runs.iter().zip(per_run) {
            if members.is_empty() {
                unused_runs.push((run.wall.clone(), run.span));
                continue;
            }
            let lengths = self.allocate(run, template, &sizing, &members);
            let mut cursor = run.span.start;
            for (pos, (&idx, length)) in members.iter().zip(&lengths).enumerate() {
                let spec = &template.zones[idx];
                let end = if pos + 1 == members.len() {
                    run.span.end
                } else {
                    cursor + length
                };
                let ordinal = zones.iter().filter(|z: &&Zone| z.wall == run.wall).count();
                zones.push(Zone {
                    id: format!("{}:z{}", run.wall, ordinal),
                    wall: run.wall.clone(),
                    name: spec.name.clone(),
                    order: idx,
                    categories: spec.categories.clone(),
                    fallbacks: spec.fallbacks.clone(),
                    span: Interval::new(cursor, end),
                });
                cursor = end;
            }
        }

        dropped.sort_unstable();
        Ok(ZonePlan {
            zones,
            dropped: dropped
                .into_iter()
                .map(|i| template.zones[i].name.clone())
                .collect(),
            unused_runs,
        })
    }

    fn sizing(&self, spec: &ZoneSpec) -> Option<Sizing> {
        let primary = std::iter::once(spec.primary())
            .chain(spec.fallbacks.iter().copied())
            .find(|c| self.catalog.has_category(*c))?;
        let cheapest = self.catalog.cheapest(primary)?;
        let base = spec.min_span.unwrap_or(0.0).max(cheapest);

        let mut categories = spec.categories.clone();
        categories.push(primary);
        let permitted = self.catalog.permitted(&categories);

        let widest = permitted
            .iter()
            .map(|m| m.max_width)
            .fold(cheapest, f64::max);
        let step = permitted
            .iter()
            .filter(|m| !m.is_elastic())
            .map(|m| m.min_width)
            .min_by(f64::total_cmp)
            .unwrap_or(cheapest);

        Some(Sizing {
            primary,
            base,
            cap: (self.max_modules as f64 * widest).max(base),
            elastic: permitted.iter().any(|m| m.is_elastic()),
            step,
        })
    }

    /// Places template entries onto runs in template order, earliest run
    /// first. Optional entries that do not fit are skipped; a required one
    /// that does not fit fails the whole assignment.
    fn assign(
        &self,
        runs: &[Run],
        template: &StyleTemplate,
        sizing: &[Option<Sizing>],
        active: &[usize],
        room: &Room,
    ) -> Result<(Vec<Vec<usize>>, Vec<usize>)> {
        let mut used = vec![0.0_f64; runs.len()];
        let mut per_run = vec![Vec::new(); runs.len()];
        let mut skipped = Vec::new();
        let mut cursor = 0usize;

        for &idx in active {
            let spec = &template.zones[idx];
            let Some(sizing) = sizing[idx] else {
                continue;
            };
            let eligible = |r: usize| spec.wall.as_ref().is_none_or(|w| runs[r].wall == *w);
            let fits = |r: usize| used[r] + sizing.base <= runs[r].span.len() + self.tolerance;

            let chosen = (cursor..runs.len())
                .find(|&r| eligible(r) && fits(r))
                .or_else(|| {
                    spec.wall
                        .as_ref()
                        .and_then(|_| (0..cursor).find(|&r| eligible(r) && fits(r)))
                });

            match chosen {
                Some(r) => {
                    used[r] += sizing.base;
                    per_run[r].push(idx);
                    cursor = cursor.max(r);
                }
                None if !spec.required => skipped.push(idx),
                None => {
                    let (wall, span) = widest_eligible(spec, runs, &used, room);
                    return Err(LayoutError::ZoneInfeasible {
                        wall,
                        zone: Some(spec.name.clone()),
                        category: sizing.primary,
                        span,
                        required: sizing.base,
                    });
                }
            }
        }

        Ok((per_run, skipped))
    }

    /// Sizes the zones sharing one run so they cover it exactly. Spare length
    /// goes first to zones that can stretch, then to rigid zones in whole
    /// module steps, and whatever is left is spread by weight regardless of
    /// capacity (resolution then reports the zone as over-span).
    fn allocate(
        &self,
        run: &Run,
        template: &StyleTemplate,
        sizing: &[Option<Sizing>],
        members: &[usize],
    ) -> Vec<f64> {
        let bounds: Vec<Sizing> = members.iter().filter_map(|&i| sizing[i]).collect();
        let weights: Vec<f64> = members.iter().map(|&i| template.zones[i].weight).collect();

        let base_total: f64 = bounds.iter().map(|s| s.base).sum();
        let slack = run.span.len() - base_total;

        let mut segments: Vec<Segment> = bounds
            .iter()
            .zip(&weights)
            .map(|(s, &w)| Segment::new(s.base, s.cap, if s.elastic { w } else { 0.0 }))
            .collect();
        let mut residual = water_fill(&mut segments, slack, self.tolerance);

        if residual > self.tolerance {
            let mut rigid: Vec<usize> = (0..segments.len())
                .filter(|&i| !bounds[i].elastic)
                .collect();
            rigid.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]).then(a.cmp(&b)));
            for i in rigid {
                let step = bounds[i].step;
                if step <= 0.0 {
                    continue;
                }
                let room_left = bounds[i].cap - segments[i].length;
                let steps = ((residual + self.tolerance) / step)
                    .floor()
                    .min(((room_left + self.tolerance) / step).floor())
                    .max(0.0);
                segments[i].length += steps * step;
                residual -= steps * step;
                if residual <= self.tolerance {
                    break;
                }
            }
        }

        if residual > self.tolerance {
            for (segment, &w) in segments.iter_mut().zip(&weights) {
                segment.max = f64::INFINITY;
                segment.flex = w;
            }
            water_fill(&mut segments, residual, self.tolerance);
        }

        segments.into_iter().map(|s| s.length).collect()
    }
}

/// Wall and remaining length of the roomiest run a spec could have used.
fn widest_eligible(spec: &ZoneSpec, runs: &[Run], used: &[f64], room: &Room) -> (WallId, f64) {
    let best = runs
        .iter()
        .zip(used)
        .filter(|(run, _)| spec.wall.as_ref().is_none_or(|w| run.wall == *w))
        .map(|(run, used)| (run, (run.span.len() - used).max(0.0)))
        .fold(None::<(&Run, f64)>, |best, (run, free)| match best {
            Some((_, best_free)) if best_free >= free => best,
            _ => Some((run, free)),
        });
    match best {
        Some((run, free)) => (run.wall.clone(), free),
        None => (
            spec.wall
                .clone()
                .or_else(|| room.walls.first().map(|w| w.id.clone()))
                .unwrap_or_default(),
            0.0,
        ),
    }
}
