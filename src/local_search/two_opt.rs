//! 2-opt and 2-opt* edge exchanges.
//!
//! # Algorithm
//!
//! Within one route, 2-opt removes edges `(a, b)` and `(c, d)` and reverses
//! the segment `b..=c`, so that `a → c` and `b → d` are formed.
//!
//! Across two routes, 2-opt* cuts both routes after `u` and `v`:
//!
//! - tail exchange: `0 … u | v+1 … 0` and `0 … v | u+1 … 0`
//! - reversed: `0 … u, v … 0` (head of `v` reversed) and
//!   `0 … u+1, v+1 … 0` (tail of `u` reversed)
//!
//! All route totals come from prefix sums; distances are symmetric so a
//! reversed segment keeps its length.
//!
//! # Complexity
//!
//! O(1) per evaluated move; O(route length) per applied move.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A Method for Solving Traveling-Salesman Problems",
//! *Operations Research* 6(6), 791-812.
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An exchange heuristic for
//! routeing problems with time windows", *JORS* 46(12), 1433-1446.

use super::engine::{Search, IMPROVEMENT_EPSILON};

impl Search<'_> {
    /// 2-opt when `u` and `v` share a route, 2-opt* otherwise.
    pub(super) fn two_opt(&mut self, u: usize, v: usize) -> bool {
        if self.route_of[u] == self.route_of[v] {
            self.two_opt_intra(u, v)
        } else {
            self.two_opt_star(u, v)
        }
    }

    pub(super) fn two_opt_intra_delta(&self, u: usize, v: usize) -> Option<f64> {
        let r = &self.routes[self.route_of[u]];
        let (pu, pv) = (self.pos_of[u], self.pos_of[v]);
        let (i, j) = (pu.min(pv), pu.max(pv));
        if j < i + 2 {
            return None;
        }
        let (a, b) = (r.node(i), r.node(i + 1));
        let (c, d) = (r.node(j), r.node(j + 1));
        let diff = self.d(a, c) + self.d(b, d) - self.d(a, b) - self.d(c, d);
        Some(self.cost(r.distance() + diff, r.load(), r.service()) - r.cost)
    }

    fn two_opt_intra(&mut self, u: usize, v: usize) -> bool {
        match self.two_opt_intra_delta(u, v) {
            Some(delta) if delta < -IMPROVEMENT_EPSILON => {
                let ru = self.route_of[u];
                let (pu, pv) = (self.pos_of[u], self.pos_of[v]);
                let (i, j) = (pu.min(pv), pu.max(pv));
                self.routes[ru].clients[i..j].reverse();
                self.refresh_route(ru);
                true
            }
            _ => false,
        }
    }

    /// Deltas of the tail exchange and of the reversed variant.
    pub(super) fn two_opt_star_deltas(&self, u: usize, v: usize) -> (f64, f64) {
        let (ru, pu) = (self.route_of[u], self.pos_of[u]);
        let (rv, pv) = (self.route_of[v], self.pos_of[v]);
        let (r1, r2) = (&self.routes[ru], &self.routes[rv]);
        let (nu, nv) = (r1.node(pu + 1), r2.node(pv + 1));
        let old = r1.cost + r2.cost;

        let (load_u_head, load_v_head) = (r1.load_to(pu), r2.load_to(pv));
        let (load_u_tail, load_v_tail) = (r1.load() - load_u_head, r2.load() - load_v_head);
        let (serv_u_head, serv_v_head) = (r1.service_to(pu), r2.service_to(pv));
        let (serv_u_tail, serv_v_tail) = (r1.service() - serv_u_head, r2.service() - serv_v_head);

        let tail = self.cost(
            r1.dist_to(pu) + self.d(u, nv) + r2.dist_from(pv + 1),
            load_u_head + load_v_tail,
            serv_u_head + serv_v_tail,
        ) + self.cost(
            r2.dist_to(pv) + self.d(v, nu) + r1.dist_from(pu + 1),
            load_v_head + load_u_tail,
            serv_v_head + serv_u_tail,
        ) - old;

        let reversed = self.cost(
            r1.dist_to(pu) + self.d(u, v) + r2.dist_to(pv),
            load_u_head + load_v_head,
            serv_u_head + serv_v_head,
        ) + self.cost(
            r1.dist_from(pu + 1) + self.d(nu, nv) + r2.dist_from(pv + 1),
            load_u_tail + load_v_tail,
            serv_u_tail + serv_v_tail,
        ) - old;

        (tail, reversed)
    }

    fn two_opt_star(&mut self, u: usize, v: usize) -> bool {
        let (tail, reversed) = self.two_opt_star_deltas(u, v);
        let (ru, pu) = (self.route_of[u], self.pos_of[u]);
        let (rv, pv) = (self.route_of[v], self.pos_of[v]);

        if tail < -IMPROVEMENT_EPSILON {
            let tail_u = self.routes[ru].clients.split_off(pu);
            let tail_v = self.routes[rv].clients.split_off(pv);
            self.routes[ru].clients.extend(tail_v);
            self.routes[rv].clients.extend(tail_u);
        } else if reversed < -IMPROVEMENT_EPSILON {
            let mut tail_u = self.routes[ru].clients.split_off(pu);
            let tail_v = self.routes[rv].clients.split_off(pv);
            let mut head_v = std::mem::take(&mut self.routes[rv].clients);
            head_v.reverse();
            tail_u.reverse();
            self.routes[ru].clients.extend(head_v);
            tail_u.extend(tail_v);
            self.routes[rv].clients = tail_u;
        } else {
            return false;
        }
        self.refresh_route(ru);
        self.refresh_route(rv);
        true
    }
}
