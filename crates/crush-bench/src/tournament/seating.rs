/// Seat orders for a two-agent duel: agent indices listed by seat.
pub struct SeatOrders {
    orders: Vec<[usize; 2]>,
}

impl SeatOrders {
    pub fn new(swap_seats: bool) -> Self {
        let mut orders = vec![[0, 1]];
        if swap_seats {
            orders.push([1, 0]);
        }
        Self { orders }
    }

    pub fn as_slice(&self) -> &[[usize; 2]] {
        &self.orders
    }
}
