//! Relocation and Or-opt chain moves.
//!
//! # Algorithm
//!
//! Removes the chain of 1–3 consecutive clients starting at `u` and
//! reinserts it, in the same orientation, just after or just before the
//! neighbor `v` (same route or another one), or alone into an empty route.
//! Removal and insertion are priced from the route prefix sums:
//!
//! - removal: `d(p, q) − d(p, a) − d(b, q)` minus the chain's inner length
//! - insertion: `d(x, a) + inner + d(b, y) − d(x, y)`
//!
//! where `p → a … b → q` is the chain in its route and `(x, y)` the target
//! edge.
//!
//! # Complexity
//!
//! O(1) per evaluated move; O(route length) per applied move.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use super::engine::{Search, IMPROVEMENT_EPSILON};

/// Longest chain moved as a block.
const MAX_CHAIN: usize = 3;

impl Search<'_> {
    /// Tries chains starting at `u` after, then before, `v`.
    pub(super) fn relocate(&mut self, u: usize, v: usize) -> bool {
        let (ru, pu) = (self.route_of[u], self.pos_of[u]);
        let (rv, pv) = (self.route_of[v], self.pos_of[v]);
        let len_u = self.routes[ru].len();

        for chain in 1..=MAX_CHAIN {
            if pu + chain - 1 > len_u {
                break;
            }
            // Longer chains would contain `v` as well.
            if ru == rv && pv >= pu && pv < pu + chain {
                break;
            }
            for gap in [pv, pv - 1] {
                if let Some(delta) = self.relocate_delta(ru, pu, chain, rv, gap) {
                    if delta < -IMPROVEMENT_EPSILON {
                        self.apply_relocate(ru, pu, chain, rv, gap);
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Tries moving `u` alone into an empty route.
    pub(super) fn relocate_to_empty(&mut self, u: usize) -> bool {
        let Some(re) = self.routes.iter().position(|r| r.is_empty()) else {
            return false;
        };
        let (ru, pu) = (self.route_of[u], self.pos_of[u]);
        match self.relocate_delta(ru, pu, 1, re, 0) {
            Some(delta) if delta < -IMPROVEMENT_EPSILON => {
                self.apply_relocate(ru, pu, 1, re, 0);
                true
            }
            _ => false,
        }
    }

    /// Cost change of moving positions `pu..pu + chain` of route `ru` into
    /// the gap after position `gap` of route `rv`.
    ///
    /// `None` when the move is a no-op or the gap lies inside the chain.
    pub(super) fn relocate_delta(
        &self,
        ru: usize,
        pu: usize,
        chain: usize,
        rv: usize,
        gap: usize,
    ) -> Option<f64> {
        let r = &self.routes[ru];
        let last = pu + chain - 1;
        let (a, b) = (r.node(pu), r.node(last));
        let (p, q) = (r.node(pu - 1), r.node(last + 1));
        let inner = r.dist_to(last) - r.dist_to(pu);
        let removal = self.d(p, q) - self.d(p, a) - inner - self.d(b, q);

        if ru == rv {
            if gap + 1 >= pu && gap <= last {
                return None;
            }
            let (x, y) = (r.node(gap), r.node(gap + 1));
            let insertion = self.d(x, a) + inner + self.d(b, y) - self.d(x, y);
            let distance = r.distance() + removal + insertion;
            return Some(self.cost(distance, r.load(), r.service()) - r.cost);
        }

        let target = &self.routes[rv];
        let (x, y) = (target.node(gap), target.node(gap + 1));
        let insertion = self.d(x, a) + inner + self.d(b, y) - self.d(x, y);
        let load = r.load_to(last) - r.load_to(pu - 1);
        let service = r.service_to(last) - r.service_to(pu - 1);

        let new_u = self.cost(r.distance() + removal, r.load() - load, r.service() - service);
        let new_v = self.cost(
            target.distance() + insertion,
            target.load() + load,
            target.service() + service,
        );
        Some(new_u + new_v - r.cost - target.cost)
    }

    fn apply_relocate(&mut self, ru: usize, pu: usize, chain: usize, rv: usize, gap: usize) {
        let moved: Vec<usize> = self.routes[ru]
            .clients
            .drain(pu - 1..pu - 1 + chain)
            .collect();
        let at = if ru == rv && gap > pu { gap - chain } else { gap };
        self.routes[rv].clients.splice(at..at, moved);
        self.refresh_route(ru);
        if rv != ru {
            self.refresh_route(rv);
        }
    }
}
