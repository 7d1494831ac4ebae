//! Client exchange (swap) move.
//!
//! # Algorithm
//!
//! Exchanges the positions of `u` and `v`, in the same route or across two
//! routes. Only the four edges around the two clients change (three when
//! they are adjacent), plus the load and service transfer between routes.
//!
//! # Complexity
//!
//! O(1) per evaluated move.

use super::engine::{Search, IMPROVEMENT_EPSILON};

impl Search<'_> {
    /// Swaps `u` and `v` if it improves the penalized cost.
    pub(super) fn swap(&mut self, u: usize, v: usize) -> bool {
        if self.swap_delta(u, v) >= -IMPROVEMENT_EPSILON {
            return false;
        }
        let (ru, pu) = (self.route_of[u], self.pos_of[u]);
        let (rv, pv) = (self.route_of[v], self.pos_of[v]);
        self.routes[ru].clients[pu - 1] = v;
        self.routes[rv].clients[pv - 1] = u;
        self.refresh_route(ru);
        if rv != ru {
            self.refresh_route(rv);
        }
        true
    }

    pub(super) fn swap_delta(&self, u: usize, v: usize) -> f64 {
        let (ru, pu) = (self.route_of[u], self.pos_of[u]);
        let (rv, pv) = (self.route_of[v], self.pos_of[v]);

        if ru == rv {
            let r = &self.routes[ru];
            let (i, j) = (pu.min(pv), pu.max(pv));
            let (a, b) = (r.node(i), r.node(j));
            let (pa, na) = (r.node(i - 1), r.node(i + 1));
            let (pb, nb) = (r.node(j - 1), r.node(j + 1));
            let diff = if j == i + 1 {
                self.d(pa, b) + self.d(a, nb) - self.d(pa, a) - self.d(b, nb)
            } else {
                self.d(pa, b) + self.d(b, na) + self.d(pb, a) + self.d(a, nb)
                    - self.d(pa, a)
                    - self.d(a, na)
                    - self.d(pb, b)
                    - self.d(b, nb)
            };
            return self.cost(r.distance() + diff, r.load(), r.service()) - r.cost;
        }

        let (r1, r2) = (&self.routes[ru], &self.routes[rv]);
        let (p1, n1) = (r1.node(pu - 1), r1.node(pu + 1));
        let (p2, n2) = (r2.node(pv - 1), r2.node(pv + 1));
        let diff1 = self.d(p1, v) + self.d(v, n1) - self.d(p1, u) - self.d(u, n1);
        let diff2 = self.d(p2, u) + self.d(u, n2) - self.d(p2, v) - self.d(v, n2);
        let inst = self.instance;
        let load = inst.demand(v) - inst.demand(u);
        let service = inst.service_duration(v) - inst.service_duration(u);

        self.cost(r1.distance() + diff1, r1.load() + load, r1.service() + service)
            + self.cost(r2.distance() + diff2, r2.load() - load, r2.service() - service)
            - r1.cost
            - r2.cost
    }
}
