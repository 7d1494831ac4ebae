//! SWAP* inter-route exchange.
//!
//! # Algorithm
//!
//! For two routes whose polar sectors overlap, exchanges a client `u` of the
//! first with a client `v` of the second, where each one is reinserted at
//! its best position in the other route rather than in the vacated slot.
//!
//! The three cheapest insertion gaps of every client into the other route
//! are precomputed. The best position of `v` in `r1 \ {u}` is then either
//! the first of those gaps not adjacent to `u`, or the slot `u` leaves.
//! The best exchange over all pairs of the two routes is applied if it
//! improves the penalized cost.
//!
//! # Complexity
//!
//! O(|r1| · |r2|) per route pair.
//!
//! # Reference
//!
//! Vidal, T. (2022). "Hybrid genetic search for the CVRP: Open-source
//! implementation and SWAP* neighborhood", *Computers & Operations Research* 140.

use super::engine::{Search, IMPROVEMENT_EPSILON};
use super::route_state::RouteState;

/// Insertion gap after extended position `gap`, with its detour cost.
#[derive(Debug, Clone, Copy)]
struct Insertion {
    cost: f64,
    gap: usize,
}

/// The three cheapest insertions, cheapest first.
#[derive(Debug, Clone, Default)]
struct ThreeBest {
    items: Vec<Insertion>,
}

impl ThreeBest {
    fn add(&mut self, cost: f64, gap: usize) {
        if self.items.len() == 3 && cost >= self.items[2].cost {
            return;
        }
        let at = self.items.partition_point(|i| i.cost <= cost);
        self.items.insert(at, Insertion { cost, gap });
        self.items.truncate(3);
    }
}

/// Chosen SWAP* exchange: client `u` of `r1` goes after node `u_after` of
/// `r2`, client `v` of `r2` goes after node `v_after` of `r1`.
#[derive(Debug, Clone, Copy)]
struct SwapStarMove {
    delta: f64,
    u: usize,
    v: usize,
    u_after: usize,
    v_after: usize,
}

impl Search<'_> {
    /// Runs SWAP* over every overlapping route pair.
    pub(super) fn swap_star_pass(&mut self) -> bool {
        let mut improved = false;
        for r1 in 0..self.routes.len() {
            for r2 in (r1 + 1)..self.routes.len() {
                let (a, b) = (&self.routes[r1], &self.routes[r2]);
                if a.is_empty() || b.is_empty() || !a.sector.overlaps(&b.sector) {
                    continue;
                }
                if self.swap_star(r1, r2) {
                    self.moves += 1;
                    improved = true;
                }
            }
        }
        improved
    }

    fn top_insertions(&self, from: &RouteState, into: &RouteState) -> Vec<ThreeBest> {
        from.clients
            .iter()
            .map(|&c| {
                let mut best = ThreeBest::default();
                for gap in 0..=into.len() {
                    let (x, y) = (into.node(gap), into.node(gap + 1));
                    best.add(self.d(x, c) + self.d(c, y) - self.d(x, y), gap);
                }
                best
            })
            .collect()
    }

    /// Cheapest insertion of `client` into `route` once the client at
    /// `removed` is taken out. Returns the detour cost and the node to insert
    /// after.
    fn best_insertion_without(
        &self,
        top: &ThreeBest,
        route: &RouteState,
        removed: usize,
        client: usize,
    ) -> (f64, usize) {
        let (prev, next) = (route.node(removed - 1), route.node(removed + 1));
        let mut best = (
            self.d(prev, client) + self.d(client, next) - self.d(prev, next),
            prev,
        );
        if let Some(ins) = top
            .items
            .iter()
            .find(|i| i.gap + 1 != removed && i.gap != removed)
        {
            if ins.cost < best.0 {
                best = (ins.cost, route.node(ins.gap));
            }
        }
        best
    }

    /// Best SWAP* exchange between routes `r1` and `r2`.
    fn best_swap_star(&self, r1: usize, r2: usize) -> Option<SwapStarMove> {
        let (route1, route2) = (&self.routes[r1], &self.routes[r2]);
        let into2 = self.top_insertions(route1, route2);
        let into1 = self.top_insertions(route2, route1);
        let inst = self.instance;

        let mut best: Option<SwapStarMove> = None;
        for (i, &u) in route1.clients.iter().enumerate() {
            let pu = i + 1;
            let remove_u = self.d(route1.node(pu - 1), u) + self.d(u, route1.node(pu + 1))
                - self.d(route1.node(pu - 1), route1.node(pu + 1));
            for (j, &v) in route2.clients.iter().enumerate() {
                let pv = j + 1;
                let remove_v = self.d(route2.node(pv - 1), v) + self.d(v, route2.node(pv + 1))
                    - self.d(route2.node(pv - 1), route2.node(pv + 1));

                let (insert_v, v_after) = self.best_insertion_without(&into1[j], route1, pu, v);
                let (insert_u, u_after) = self.best_insertion_without(&into2[i], route2, pv, u);

                let load = inst.demand(v) - inst.demand(u);
                let service = inst.service_duration(v) - inst.service_duration(u);
                let delta = self.cost(
                    route1.distance() - remove_u + insert_v,
                    route1.load() + load,
                    route1.service() + service,
                ) + self.cost(
                    route2.distance() - remove_v + insert_u,
                    route2.load() - load,
                    route2.service() - service,
                ) - route1.cost
                    - route2.cost;

                if best.map_or(true, |b| delta < b.delta) {
                    best = Some(SwapStarMove {
                        delta,
                        u,
                        v,
                        u_after,
                        v_after,
                    });
                }
            }
        }
        best
    }

    fn swap_star(&mut self, r1: usize, r2: usize) -> bool {
        let Some(mv) = self.best_swap_star(r1, r2) else {
            return false;
        };
        if mv.delta >= -IMPROVEMENT_EPSILON {
            return false;
        }
        self.routes[r1].clients.retain(|&c| c != mv.u);
        self.routes[r2].clients.retain(|&c| c != mv.v);
        insert_after(&mut self.routes[r1].clients, mv.v_after, mv.v);
        insert_after(&mut self.routes[r2].clients, mv.u_after, mv.u);
        self.refresh_route(r1);
        self.refresh_route(r2);
        true
    }
}

/// Inserts `client` right after node `after` (0 = route start).
fn insert_after(clients: &mut Vec<usize>, after: usize, client: usize) {
    let at = if after == 0 {
        0
    } else {
        clients
            .iter()
            .position(|&c| c == after)
            .map_or(clients.len(), |k| k + 1)
    };
    clients.insert(at, client);
}
