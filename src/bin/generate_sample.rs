use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Serialize)]
struct OrderRow<'a> {
    order_id: u64,
    order_date: String,
    customer_name: &'a str,
    product: &'a str,
    city: &'a str,
    quantity: u64,
    price: String,
    payment_method: &'a str,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in `0..n`.
    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // (product, base price in cents)
    let products: [(&str, u64); 6] = [
        ("Laptop", 89_900),
        ("Smartphone", 59_900),
        ("Headphones", 7_950),
        ("Keyboard", 4_500),
        ("Monitor", 21_990),
        ("Mouse", 2_499),
    ];
    let cities = ["Paris", "Lyon", "Marseille", "Toulouse", "Lille", "Bordeaux"];
    let customers = [
        "Alice Martin", "Bruno Petit", "Chloé Bernard", "David Moreau", "Emma Laurent",
        "Farid Haddad", "Gaëlle Roux", "Hugo Fournier", "Inès Girard", "Julien Lambert",
    ];
    let methods = ["Credit Card", "PayPal", "Bank Transfer", "Cash"];

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).context("invalid start date")?;
    let n_orders = 1_000u64;

    let output_path = "sample_orders.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;

    for order_id in 1..=n_orders {
        let date = start + Duration::days(rng.below(730) as i64);
        let time = format!("{:02}:{:02}:00", 8 + rng.below(14), rng.below(60));
        let &(product, cents) = rng.pick(&products);
        // +/- 10% around the base price
        let cents = cents * (90 + rng.below(21)) / 100;

        writer.serialize(OrderRow {
            order_id,
            order_date: format!("{} {time}", date.format("%Y-%m-%d")),
            customer_name: *rng.pick(&customers),
            product,
            city: *rng.pick(&cities),
            quantity: 1 + rng.below(5),
            price: format!("{}.{:02}", cents / 100, cents % 100),
            payment_method: *rng.pick(&methods),
        })?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {n_orders} orders to {output_path}");
    Ok(())
}
