use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{
    prelude::FromRow,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    errors::{AppError, AppResult},
    repository::{
        BookingRepository, CommentRepository, ItemPatch, ItemRepository, ItemRequestRepository,
        NewBooking, NewComment, NewItem, NewItemRequest, NewUser, UserPatch, UserRepository,
    },
    structs::{Booking, BookingStatus, Comment, Item, ItemRequest, User},
};

pub async fn connect(database_url: &str) -> AppResult<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePool::connect_with(opts).await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database. Every connection to `:memory:` opens a
/// fresh database, so the pool must never hand out a second one.
pub async fn connect_in_memory() -> AppResult<SqlitePool> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    sqlx::migrate!().run(pool).await?;
    log::info!("Database migrated successfully");
    Ok(())
}

// ---------------------------------------------------------------------------
// users

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email) VALUES (?1, ?2) RETURNING id, name, email",
        )
        .bind(user.name)
        .bind(user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, "User with this email"))?;
        log::info!("User created: {:?}", user);
        Ok(user)
    }

    async fn update(&self, id: i64, patch: UserPatch) -> AppResult<Option<User>> {
        // Only the columns present in the patch are written.
        let mut param_index = 1;
        let mut sets = Vec::new();
        if patch.name.is_some() {
            sets.push(format!("name = ?{}", param_index));
            param_index += 1;
        }
        if patch.email.is_some() {
            sets.push(format!("email = ?{}", param_index));
            param_index += 1;
        }
        if sets.is_empty() {
            return self.find_by_id(id).await;
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = ?{} RETURNING id, name, email",
            sets.join(", "),
            param_index
        );
        let mut q = sqlx::query_as::<_, User>(&query);
        if let Some(name) = &patch.name {
            q = q.bind(name);
        }
        if let Some(email) = &patch.email {
            q = q.bind(email);
        }
        let user = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "User with this email"))?;
        log::info!("User updated: {:?}", user);
        Ok(user)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "User"))?;
        log::info!("User with id {} deleted", id);
        Ok(res.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// items

const ITEM_COLUMNS: &str = "id, name, description, available, owner_id, request_id";

#[derive(Clone)]
pub struct SqliteItemRepository {
    pool: SqlitePool,
}

impl SqliteItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for SqliteItemRepository {
    async fn create(&self, item: NewItem) -> AppResult<Item> {
        let query = format!(
            "INSERT INTO items (name, description, available, owner_id, request_id) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {ITEM_COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&query)
            .bind(item.name)
            .bind(item.description)
            .bind(item.available)
            .bind(item.owner_id)
            .bind(item.request_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "Item"))?;
        log::info!("Item created: {:?}", item);
        Ok(item)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1");
        let item = sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn update(&self, id: i64, patch: ItemPatch) -> AppResult<Option<Item>> {
        let mut param_index = 1;
        let mut sets = Vec::new();
        if patch.name.is_some() {
            sets.push(format!("name = ?{}", param_index));
            param_index += 1;
        }
        if patch.description.is_some() {
            sets.push(format!("description = ?{}", param_index));
            param_index += 1;
        }
        if patch.available.is_some() {
            sets.push(format!("available = ?{}", param_index));
            param_index += 1;
        }
        if sets.is_empty() {
            return self.find_by_id(id).await;
        }

        let query = format!(
            "UPDATE items SET {} WHERE id = ?{} RETURNING {ITEM_COLUMNS}",
            sets.join(", "),
            param_index
        );
        let mut q = sqlx::query_as::<_, Item>(&query);
        if let Some(name) = &patch.name {
            q = q.bind(name);
        }
        if let Some(description) = &patch.description {
            q = q.bind(description);
        }
        if let Some(available) = patch.available {
            q = q.bind(available);
        }
        let item = q.bind(id).fetch_optional(&self.pool).await?;
        log::info!("Item updated: {:?}", item);
        Ok(item)
    }

    async fn find_by_owner(&self, owner_id: i64, offset: i64, limit: i64) -> AppResult<Vec<Item>> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ?1 ORDER BY id ASC LIMIT ?2 OFFSET ?3"
        );
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn search(&self, text: &str, offset: i64, limit: i64) -> AppResult<Vec<Item>> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE available = 1 \
               AND (UPPER(name) LIKE '%' || UPPER(?1) || '%' \
                 OR UPPER(description) LIKE '%' || UPPER(?1) || '%') \
             ORDER BY id ASC LIMIT ?2 OFFSET ?3"
        );
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(text)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn find_by_request(&self, request_id: i64) -> AppResult<Vec<Item>> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM items WHERE request_id = ?1 ORDER BY id");
        let items = sqlx::query_as::<_, Item>(&query)
            .bind(request_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// bookings

const BOOKING_SELECT: &str = "\
    SELECT b.id, b.start_date, b.end_date, b.status, \
           i.id AS item_id, i.name AS item_name, i.description AS item_description, \
           i.available AS item_available, i.owner_id AS item_owner_id, \
           i.request_id AS item_request_id, \
           u.id AS booker_id, u.name AS booker_name, u.email AS booker_email \
    FROM bookings AS b \
    INNER JOIN items AS i ON i.id = b.item_id \
    INNER JOIN users AS u ON u.id = b.booker_id";

#[derive(FromRow)]
struct BookingRow {
    id: i64,
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    status: BookingStatus,
    item_id: i64,
    item_name: String,
    item_description: String,
    item_available: bool,
    item_owner_id: i64,
    item_request_id: Option<i64>,
    booker_id: i64,
    booker_name: String,
    booker_email: String,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            start: row.start_date,
            end: row.end_date,
            status: row.status,
            item: Item {
                id: row.item_id,
                name: row.item_name,
                description: row.item_description,
                available: row.item_available,
                owner_id: row.item_owner_id,
                request_id: row.item_request_id,
            },
            booker: User {
                id: row.booker_id,
                name: row.booker_name,
                email: row.booker_email,
            },
        }
    }
}

#[derive(Clone)]
pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, query: &str, binds: &[i64]) -> AppResult<Vec<Booking>> {
        let mut q = sqlx::query_as::<_, BookingRow>(query);
        for value in binds {
            q = q.bind(*value);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO bookings (start_date, end_date, item_id, booker_id, status) \
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
        )
        .bind(booking.start)
        .bind(booking.end)
        .bind(booking.item_id)
        .bind(booking.booker_id)
        .bind(BookingStatus::Waiting)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, "Booking"))?;

        let query = format!("{BOOKING_SELECT} WHERE b.id = ?1");
        let row = sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let booking = Booking::from(row);
        log::info!("Booking created: id={} item={}", booking.id, booking.item.id);
        Ok(booking)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>> {
        let query = format!("{BOOKING_SELECT} WHERE b.id = ?1");
        let row = sqlx::query_as::<_, BookingRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Booking::from))
    }

    async fn compare_and_set_status(
        &self,
        id: i64,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> AppResult<bool> {
        let res = sqlx::query("UPDATE bookings SET status = ?1 WHERE id = ?2 AND status = ?3")
            .bind(status)
            .bind(id)
            .bind(expected)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn find_by_booker(
        &self,
        booker_id: i64,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Booking>> {
        let query = format!(
            "{BOOKING_SELECT} WHERE b.booker_id = ?1 \
             ORDER BY b.start_date DESC, b.id DESC LIMIT ?2 OFFSET ?3"
        );
        self.fetch(&query, &[booker_id, limit, offset]).await
    }

    async fn find_all_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>> {
        let query = format!("{BOOKING_SELECT} WHERE b.booker_id = ?1 ORDER BY b.id ASC");
        self.fetch(&query, &[booker_id]).await
    }

    async fn find_by_item_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Booking>> {
        let query = format!(
            "{BOOKING_SELECT} WHERE i.owner_id = ?1 \
             ORDER BY b.start_date DESC, b.id DESC LIMIT ?2 OFFSET ?3"
        );
        self.fetch(&query, &[owner_id, limit, offset]).await
    }

    async fn count_by_item_owner(&self, owner_id: i64) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bookings AS b \
             INNER JOIN items AS i ON i.id = b.item_id \
             WHERE i.owner_id = ?1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Booking>> {
        let query = format!("{BOOKING_SELECT} WHERE b.item_id = ?1 ORDER BY b.start_date ASC");
        self.fetch(&query, &[item_id]).await
    }
}

// ---------------------------------------------------------------------------
// comments

const COMMENT_SELECT: &str = "\
    SELECT c.id, c.text, c.item_id, c.author_id, u.name AS author_name, c.created \
    FROM comments AS c \
    INNER JOIN users AS u ON u.id = c.author_id";

#[derive(Clone)]
pub struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn create(&self, comment: NewComment) -> AppResult<Comment> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO comments (text, item_id, author_id, created) \
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
        )
        .bind(comment.text)
        .bind(comment.item_id)
        .bind(comment.author_id)
        .bind(comment.created)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, "Comment"))?;

        let query = format!("{COMMENT_SELECT} WHERE c.id = ?1");
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        log::info!("Comment created: id={} item={}", comment.id, comment.item_id);
        Ok(comment)
    }

    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>> {
        let query = format!("{COMMENT_SELECT} WHERE c.item_id = ?1 ORDER BY c.id ASC");
        let comments = sqlx::query_as::<_, Comment>(&query)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }
}

// ---------------------------------------------------------------------------
// item requests

const REQUEST_COLUMNS: &str = "id, description, requester_id, created";

#[derive(Clone)]
pub struct SqliteItemRequestRepository {
    pool: SqlitePool,
}

impl SqliteItemRequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRequestRepository for SqliteItemRequestRepository {
    async fn create(&self, request: NewItemRequest) -> AppResult<ItemRequest> {
        let query = format!(
            "INSERT INTO requests (description, requester_id, created) \
             VALUES (?1, ?2, ?3) RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, ItemRequest>(&query)
            .bind(request.description)
            .bind(request.requester_id)
            .bind(request.created)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_write(e, "Item request"))?;
        log::info!("Item request created: {:?}", request);
        Ok(request)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>> {
        let query = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1");
        let request = sqlx::query_as::<_, ItemRequest>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(request)
    }

    async fn find_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE requester_id = ?1 \
             ORDER BY created DESC, id DESC"
        );
        let requests = sqlx::query_as::<_, ItemRequest>(&query)
            .bind(requester_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }

    async fn find_by_other_requesters(
        &self,
        requester_id: i64,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<ItemRequest>> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE requester_id != ?1 \
             ORDER BY created DESC, id DESC LIMIT ?2 OFFSET ?3"
        );
        let requests = sqlx::query_as::<_, ItemRequest>(&query)
            .bind(requester_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }
}
