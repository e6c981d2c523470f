//! Demo data seeder.
//!
//! Wipes and repopulates the database with a demo fleet of parking lots,
//! driver accounts, sessions with matching payments, and support tickets.
//! The default admin login is `admin@lotkeeper.dev` / `password123`.

use chrono::{Datelike, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use lotkeeper_core::billing;
use lotkeeper_core::{PaymentMethod, SessionStatus, TicketCategory, TicketPriority, TicketStatus};
use lotkeeper_server::services::auth::hash_password;

use super::{CliError, connect};

/// Shared password for every seeded account.
const SEED_PASSWORD: &str = "password123";

const FIRST_NAMES: &[&str] = &[
    "Juan", "Maria", "Carlos", "Ana", "Luis", "Sofia", "Miguel", "Laura", "Pedro", "Carmen",
    "Valeria", "Andres", "Fernanda", "Diego", "Paola", "Ricardo", "Daniela", "Jorge", "Luisa",
    "Roberto", "Adriana", "Sebastian", "Gabriela", "Hector", "Diana", "Mauricio", "Patricia",
    "Oscar", "Rebeca", "Fabian",
];

const LAST_NAMES: &[&str] = &[
    "Garcia", "Rodriguez", "Martinez", "Lopez", "Gonzalez", "Hernandez", "Perez", "Sanchez",
    "Ramirez", "Flores", "Torres", "Alvarez", "Ruiz", "Castillo", "Ortiz", "Morales", "Vargas",
    "Jimenez", "Navarro", "Dominguez",
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "hotmail.com", "yahoo.com", "outlook.com"];

const AMENITIES: &[&str] = &["surveillance", "covered", "cameras", "insurance"];

const TICKET_SUBJECTS: &[&str] = &[
    "Problem with a payment",
    "Entry code not scanning",
    "Question about invoicing",
    "Could not access the lot",
];

/// Demo lots: name, address, latitude, longitude, spots, hourly rate,
/// opening hours.
#[allow(clippy::type_complexity)]
const LOTS: &[(&str, &str, f64, f64, i32, u32, &str, &str)] = &[
    ("Plaza Patria", "Av. Independencia 1234, Centro", 21.8853, -102.2916, 100, 25, "07:00", "22:00"),
    ("Galerias Mall", "Blvd. Zacatecas 1000, Norte", 21.9234, -102.2987, 200, 30, "10:00", "21:00"),
    ("Hospital Regional", "Av. Independencia 456, Centro", 21.8820, -102.2950, 80, 20, "00:00", "23:59"),
    ("Universidad Tecnologica", "Blvd. Juan Pablo II 1850", 21.9156, -102.3201, 150, 15, "06:00", "23:00"),
    ("Aeropuerto Jesus Teran", "Carretera Panamericana Km 22", 21.7056, -102.3178, 300, 40, "00:00", "23:59"),
    ("Parque San Marcos", "Av. Convencion Sur 890, Centro", 21.8790, -102.2890, 180, 22, "08:00", "20:00"),
    ("Centro de Convenciones", "Av. Universidad 1001", 21.9012, -102.2734, 250, 35, "08:00", "22:00"),
    ("Mercado Morelos", "Calle 5 de Mayo 245, Centro", 21.8812, -102.2923, 90, 18, "06:00", "19:00"),
    ("Estadio Victoria", "Av. Tecnologico 901", 21.9123, -102.2845, 400, 50, "08:00", "23:00"),
    ("Plaza Vestir", "Av. Aguascalientes Norte 101", 21.8900, -102.2850, 220, 28, "10:00", "21:00"),
    ("Zona Financiera", "Av. Convencion Norte 617", 21.8945, -102.2812, 260, 38, "07:00", "20:00"),
    ("Terminal de Autobuses", "Av. Convencion de 1914 Sur 102", 21.8678, -102.2934, 300, 30, "00:00", "23:59"),
];

/// Seed the database.
///
/// # Errors
///
/// Returns `CliError` on any database failure.
pub async fn run(drivers: usize, sessions: usize, tickets: usize) -> Result<(), CliError> {
    let pool = connect().await?;
    let mut rng = rand::rng();

    tracing::info!("Clearing existing data...");
    sqlx::query(
        "TRUNCATE ticket_messages, support_tickets, plan_purchases, payments, \
         parking_sessions, parking_lots, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    let password_hash =
        hash_password(SEED_PASSWORD).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    tracing::info!("Seeding users...");
    let admin_id: i64 = insert_user(
        &pool,
        "admin@lotkeeper.dev",
        &password_hash,
        "admin",
        "Lotkeeper Admin",
    )
    .await?;

    let mut user_ids = Vec::with_capacity(drivers);
    for i in 0..drivers {
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Juan");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Garcia");
        let domain = EMAIL_DOMAINS.choose(&mut rng).copied().unwrap_or("gmail.com");
        let email = format!("{}.{}{i}@{domain}", first.to_lowercase(), last.to_lowercase());

        let id = insert_user(
            &pool,
            &email,
            &password_hash,
            "driver",
            &format!("{first} {last}"),
        )
        .await?;
        user_ids.push(id);
    }

    tracing::info!("Seeding parking lots...");
    let mut lot_ids = Vec::with_capacity(LOTS.len());
    for (name, address, lat, lng, spots, rate, open, close) in LOTS {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO parking_lots \
             (name, address, latitude, longitude, total_spots, hourly_rate, open_time, close_time, amenities) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
        )
        .bind(name)
        .bind(address)
        .bind(lat)
        .bind(lng)
        .bind(spots)
        .bind(Decimal::from(*rate))
        .bind(open)
        .bind(close)
        .bind(AMENITIES.iter().map(ToString::to_string).collect::<Vec<_>>())
        .fetch_one(&pool)
        .await?;
        lot_ids.push((id, Decimal::from(*rate)));
    }

    tracing::info!("Seeding sessions and payments...");
    let statuses = [
        SessionStatus::Active,
        SessionStatus::Paid,
        SessionStatus::Paid,
        SessionStatus::Finalized,
    ];
    let methods = [
        PaymentMethod::Card,
        PaymentMethod::Wallet,
        PaymentMethod::Transfer,
    ];

    for _ in 0..sessions {
        let Some(&user_id) = user_ids.choose(&mut rng) else {
            break;
        };
        let Some(&(lot_id, rate)) = lot_ids.choose(&mut rng) else {
            break;
        };
        let status = statuses.choose(&mut rng).copied().unwrap_or(SessionStatus::Active);

        let entry_time = Utc::now() - Duration::minutes(rng.random_range(60..90 * 24 * 60));
        let hours = rng.random_range(1..=8i64);
        let exit_time = (status == SessionStatus::Finalized)
            .then(|| entry_time + Duration::hours(hours));

        let (session_id,): (i64,) = sqlx::query_as(
            "INSERT INTO parking_sessions \
             (user_id, lot_id, entry_code, plate, entry_time, exit_time, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(user_id)
        .bind(lot_id)
        .bind(Uuid::new_v4())
        .bind(random_plate(&mut rng))
        .bind(entry_time)
        .bind(exit_time)
        .bind(status.to_string())
        .fetch_one(&pool)
        .await?;

        if status == SessionStatus::Active {
            continue;
        }

        let fee = billing::quote(rate, hours, billing::default_tax_rate(), Decimal::ZERO)
            .map_err(|e| CliError::InvalidInput(e.to_string()))?
            .rounded();
        let method = methods.choose(&mut rng).copied().unwrap_or_default();
        let paid_at = entry_time + Duration::hours(hours) - Duration::minutes(30);

        let (payment_id,): (i64,) = sqlx::query_as(
            "INSERT INTO payments \
             (session_id, user_id, transaction_ref, subtotal, tax, discount, total, \
              method, provider, billed_hours, hourly_rate, paid_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING id",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(format!("TXN-SEED-{session_id:08}"))
        .bind(fee.subtotal)
        .bind(fee.tax)
        .bind(fee.discount)
        .bind(fee.total)
        .bind(method.to_string())
        .bind("openpayments")
        .bind(hours)
        .bind(rate)
        .bind(paid_at)
        .fetch_one(&pool)
        .await?;

        sqlx::query("UPDATE parking_sessions SET amount = $2, payment_id = $3 WHERE id = $1")
            .bind(session_id)
            .bind(fee.total)
            .bind(payment_id)
            .execute(&pool)
            .await?;
    }

    // Reconcile stored occupancy with the open sessions just created.
    sqlx::query(
        "UPDATE parking_lots SET occupied_spots = LEAST(total_spots, ( \
             SELECT COUNT(*) FROM parking_sessions \
             WHERE lot_id = parking_lots.id AND status IN ('active', 'paid')))",
    )
    .execute(&pool)
    .await?;

    tracing::info!("Seeding support tickets...");
    let categories = [
        TicketCategory::Technical,
        TicketCategory::Billing,
        TicketCategory::Commercial,
        TicketCategory::Other,
    ];
    let priorities = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
    ];
    let ticket_statuses = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    for _ in 0..tickets {
        let Some(&user_id) = user_ids.choose(&mut rng) else {
            break;
        };
        let category = categories.choose(&mut rng).copied().unwrap_or_default();
        let priority = priorities.choose(&mut rng).copied().unwrap_or_default();
        let status = ticket_statuses.choose(&mut rng).copied().unwrap_or_default();
        let subject = TICKET_SUBJECTS
            .choose(&mut rng)
            .copied()
            .unwrap_or("Problem with a payment");
        let created_at = Utc::now() - Duration::minutes(rng.random_range(0..60 * 24 * 60));
        let resolved = matches!(status, TicketStatus::Resolved | TicketStatus::Closed);

        let (ticket_id,): (i64,) = sqlx::query_as(
            "INSERT INTO support_tickets \
             (ticket_number, user_id, category, priority, status, subject, created_at, \
              resolved_at, sla_deadline) \
             VALUES ('', $1, $2, $3, $4, $5, $6, $7, $6 + interval '2 hours') RETURNING id",
        )
        .bind(user_id)
        .bind(category.to_string())
        .bind(priority.to_string())
        .bind(status.to_string())
        .bind(subject)
        .bind(created_at)
        .bind(resolved.then(|| created_at + Duration::hours(2)))
        .fetch_one(&pool)
        .await?;

        sqlx::query("UPDATE support_tickets SET ticket_number = $2 WHERE id = $1")
            .bind(ticket_id)
            .bind(format!("TKT-{}-{ticket_id:05}", created_at.year()))
            .execute(&pool)
            .await?;

        sqlx::query(
            "INSERT INTO ticket_messages (ticket_id, author, author_user_id, body, created_at) \
             VALUES ($1, 'user', $2, 'I need help with this problem', $3)",
        )
        .bind(ticket_id)
        .bind(user_id)
        .bind(created_at)
        .execute(&pool)
        .await?;

        if status != TicketStatus::Open {
            sqlx::query(
                "INSERT INTO ticket_messages (ticket_id, author, author_user_id, body, created_at) \
                 VALUES ($1, 'support', $2, 'Thanks for reaching out, we are looking into it', $3)",
            )
            .bind(ticket_id)
            .bind(admin_id)
            .bind(created_at + Duration::minutes(45))
            .execute(&pool)
            .await?;
        }
    }

    tracing::info!(
        drivers,
        lots = LOTS.len(),
        sessions,
        tickets,
        "Seed complete. Admin login: admin@lotkeeper.dev / {SEED_PASSWORD}"
    );
    Ok(())
}

async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    role: &str,
    full_name: &str,
) -> Result<i64, CliError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (email, password_hash, role, full_name, phone) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(full_name)
    .bind(format!("449{:07}", rand::rng().random_range(1_000_000..10_000_000)))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// A random plate in the `AAA-123` shape the app accepts.
fn random_plate(rng: &mut impl Rng) -> String {
    const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    let mut plate = String::with_capacity(7);
    for _ in 0..3 {
        let idx = rng.random_range(0..LETTERS.len());
        plate.push(char::from(LETTERS.get(idx).copied().unwrap_or(b'A')));
    }
    plate.push('-');
    for _ in 0..3 {
        plate.push(char::from_digit(rng.random_range(0..10), 10).unwrap_or('0'));
    }
    plate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_plate_is_valid() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let plate = random_plate(&mut rng);
            assert!(lotkeeper_core::PlateNumber::parse(&plate).is_ok(), "{plate}");
        }
    }
}
