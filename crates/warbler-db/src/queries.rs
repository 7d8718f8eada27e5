use crate::migrations::{DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};
use crate::models::{AuthoredMessage, MessageRow, ProfileUpdate, UserCounts, UserRow};
use crate::{Database, DbError, MAX_MESSAGE_LEN, password};
use anyhow::Result;
use rusqlite::{Connection, Row};
use tracing::{debug, info};

const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.image_url, u.header_image_url, u.bio, u.location, u.password";

const MESSAGE_COLUMNS: &str = "m.id, m.text, m.timestamp, m.user_id";

impl Database {
    // -- Users --

    /// Hash the password and insert a new user. `image_url = None` keeps the
    /// default avatar.
    pub fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
        image_url: Option<&str>,
    ) -> Result<UserRow> {
        for (field, value) in [("username", username), ("email", email), ("password", password)] {
            if value.trim().is_empty() {
                return Err(DbError::MissingField(field).into());
            }
        }

        // Hash outside the lock; Argon2 is deliberately slow.
        let hashed = password::hash(password)?;
        let image_url = non_blank(image_url).unwrap_or(DEFAULT_IMAGE_URL);

        let user = self.with_conn(|conn| {
            ensure_unique(conn, username, email, None)?;
            conn.execute(
                "INSERT INTO users (email, username, image_url, password) VALUES (?1, ?2, ?3, ?4)",
                (email, username, image_url, &hashed),
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or_else(|| DbError::NotFound.into())
        })?;

        info!("Signed up user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Returns the user only when the username exists and the password matches.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRow>> {
        let user = self.get_user_by_username(username)?;
        Ok(user.filter(|u| password::verify(password, &u.password)))
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1");
            conn.query_row(&sql, [username], user_from_row).optional()
        })
    }

    /// All users, or those whose username contains `q`.
    pub fn search_users(&self, q: Option<&str>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| match non_blank(q) {
            Some(q) => {
                let sql = format!(
                    "SELECT {USER_COLUMNS} FROM users u WHERE u.username LIKE ?1 ESCAPE '\\' ORDER BY u.id"
                );
                collect_users(conn, &sql, [format!("%{}%", escape_like(q))])
            }
            None => {
                let sql = format!("SELECT {USER_COLUMNS} FROM users u ORDER BY u.id");
                collect_users(conn, &sql, rusqlite::params![])
            }
        })
    }

    pub fn update_user(&self, id: i64, update: &ProfileUpdate) -> Result<UserRow> {
        for (field, value) in [("username", &update.username), ("email", &update.email)] {
            if value.trim().is_empty() {
                return Err(DbError::MissingField(field).into());
            }
        }

        self.with_conn(|conn| {
            ensure_unique(conn, &update.username, &update.email, Some(id))?;
            let changed = conn.execute(
                "UPDATE users
                 SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4,
                     bio = ?5, location = ?6
                 WHERE id = ?7",
                rusqlite::params![
                    update.username,
                    update.email,
                    non_blank(update.image_url.as_deref()).unwrap_or(DEFAULT_IMAGE_URL),
                    non_blank(update.header_image_url.as_deref())
                        .unwrap_or(DEFAULT_HEADER_IMAGE_URL),
                    non_blank(update.bio.as_deref()),
                    non_blank(update.location.as_deref()),
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound.into());
            }
            query_user_by_id(conn, id)?.ok_or_else(|| DbError::NotFound.into())
        })
    }

    /// Deletes the user together with their messages, follows and likes.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let deleted = self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])?))?;
        if deleted > 0 {
            info!("Deleted user {}", id);
        }
        Ok(deleted > 0)
    }

    pub fn counts_for_user(&self, id: i64) -> Result<UserCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM messages WHERE user_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1),
                    (SELECT COUNT(*) FROM likes WHERE user_id = ?1)",
                [id],
                |row| {
                    Ok(UserCounts {
                        messages: row.get(0)?,
                        following: row.get(1)?,
                        followers: row.get(2)?,
                        likes: row.get(3)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }

    // -- Follows --

    /// Users following `user_id`.
    pub fn followers(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 JOIN follows f ON f.user_following_id = u.id
                 WHERE f.user_being_followed_id = ?1
                 ORDER BY u.id"
            );
            collect_users(conn, &sql, [user_id])
        })
    }

    /// Users `user_id` follows.
    pub fn following(&self, user_id: i64) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users u
                 JOIN follows f ON f.user_being_followed_id = u.id
                 WHERE f.user_following_id = ?1
                 ORDER BY u.id"
            );
            collect_users(conn, &sql, [user_id])
        })
    }

    /// Does `user_id` follow `other_id`?
    pub fn is_following(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| follow_exists(conn, other_id, user_id))
    }

    /// Is `user_id` followed by `other_id`?
    pub fn is_followed_by(&self, user_id: i64, other_id: i64) -> Result<bool> {
        self.with_conn(|conn| follow_exists(conn, user_id, other_id))
    }

    /// Record that `follower_id` follows `followed_id`. Following twice is a no-op.
    pub fn follow(&self, follower_id: i64, followed_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id) VALUES (?1, ?2)",
                [followed_id, follower_id],
            )?;
            Ok(())
        })?;
        debug!("User {} follows {}", follower_id, followed_id);
        Ok(())
    }

    pub fn unfollow(&self, follower_id: i64, followed_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
                [followed_id, follower_id],
            )?;
            Ok(removed > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, user_id: i64, text: &str) -> Result<MessageRow> {
        if text.trim().is_empty() {
            return Err(DbError::MissingField("text").into());
        }
        if text.chars().count() > MAX_MESSAGE_LEN {
            return Err(DbError::MessageTooLong.into());
        }

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (text, timestamp, user_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![text, timestamp, user_id],
            )?;
            Ok(MessageRow {
                id: conn.last_insert_rowid(),
                text: text.to_string(),
                timestamp,
                user_id,
            })
        })
    }

    pub fn get_message(&self, id: i64) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages m WHERE m.id = ?1");
            conn.query_row(&sql, [id], message_from_row).optional()
        })
    }

    /// The user who wrote `message`.
    pub fn message_author(&self, message: &MessageRow) -> Result<UserRow> {
        self.get_user(message.user_id)?
            .ok_or_else(|| DbError::NotFound.into())
    }

    pub fn delete_message(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM messages WHERE id = ?1", [id])? > 0))
    }

    /// Every message `user_id` wrote, newest first.
    pub fn messages_for_user(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        self.recent_messages_for_user(user_id, -1)
    }

    /// The newest `limit` messages `user_id` wrote. A negative limit means all.
    pub fn recent_messages_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages m
                 WHERE m.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id, limit], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Messages by `user_id` and everyone they follow, newest first.
    pub fn home_timeline(&self, user_id: i64, limit: i64) -> Result<Vec<AuthoredMessage>> {
        self.with_conn(|conn| {
            // JOIN users to fetch the author alongside each message (avoids N+1)
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}, {USER_COLUMNS}
                 FROM messages m
                 JOIN users u ON m.user_id = u.id
                 WHERE m.user_id = ?1
                    OR m.user_id IN (SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1)
                 ORDER BY m.timestamp DESC, m.id DESC
                 LIMIT ?2"
            );
            collect_authored(conn, &sql, [user_id, limit])
        })
    }

    // -- Likes --

    /// Messages `user_id` liked.
    pub fn liked_messages(&self, user_id: i64) -> Result<Vec<MessageRow>> {
        Ok(self
            .liked_timeline(user_id)?
            .into_iter()
            .map(|authored| authored.message)
            .collect())
    }

    /// Messages `user_id` liked together with their authors, newest first.
    pub fn liked_timeline(&self, user_id: i64) -> Result<Vec<AuthoredMessage>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS}, {USER_COLUMNS}
                 FROM likes l
                 JOIN messages m ON l.message_id = m.id
                 JOIN users u ON m.user_id = u.id
                 WHERE l.user_id = ?1
                 ORDER BY m.timestamp DESC, m.id DESC"
            );
            collect_authored(conn, &sql, [user_id])
        })
    }

    pub fn liked_message_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT message_id FROM likes WHERE user_id = ?1")?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<i64>, _>>()?;
            Ok(ids)
        })
    }

    /// Liking twice is a no-op.
    pub fn add_like(&self, user_id: i64, message_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO likes (user_id, message_id) VALUES (?1, ?2)",
                [user_id, message_id],
            )?;
            Ok(())
        })
    }

    pub fn remove_like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2",
                [user_id, message_id],
            )?;
            Ok(removed > 0)
        })
    }

    /// Toggle a like: removes if it exists, inserts if not.
    /// Returns true when the message is liked afterwards.
    pub fn toggle_like(&self, user_id: i64, message_id: i64) -> Result<bool> {
        if self.remove_like(user_id, message_id)? {
            Ok(false)
        } else {
            self.add_like(user_id, message_id)?;
            Ok(true)
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Escape LIKE metacharacters; pairs with `ESCAPE '\'`.
fn escape_like(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len());
    for c in q.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Reject a username or email already held by someone other than `except`.
fn ensure_unique(conn: &Connection, username: &str, email: &str, except: Option<i64>) -> Result<()> {
    let except = except.unwrap_or(-1);
    let taken = |column: &str, value: &str| -> Result<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM users WHERE {column} = ?1 AND id != ?2)");
        Ok(conn.query_row(&sql, rusqlite::params![value, except], |row| row.get(0))?)
    };

    if taken("username", username)? {
        return Err(DbError::UsernameTaken.into());
    }
    if taken("email", email)? {
        return Err(DbError::EmailTaken.into());
    }
    Ok(())
}

fn follow_exists(conn: &Connection, followed_id: i64, follower_id: i64) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE user_being_followed_id = ?1 AND user_following_id = ?2)",
        [followed_id, follower_id],
        |row| row.get(0),
    )?)
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    conn.query_row(&sql, [id], user_from_row).optional()
}

fn collect_users<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, user_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn collect_authored<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<AuthoredMessage>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, |row| {
            Ok(AuthoredMessage {
                message: message_from_row(row)?,
                author: user_from_row_at(row, 4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    user_from_row_at(row, 0)
}

fn user_from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(offset)?,
        email: row.get(offset + 1)?,
        username: row.get(offset + 2)?,
        image_url: row.get(offset + 3)?,
        header_image_url: row.get(offset + 4)?,
        bio: row.get(offset + 5)?,
        location: row.get(offset + 6)?,
        password: row.get(offset + 7)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: row.get(2)?,
        user_id: row.get(3)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        db: Database,
        u1: UserRow,
        u2: UserRow,
    }

    fn setup() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let u1 = db.signup("test1", "test1@email.com", "password", None).unwrap();
        let u2 = db.signup("test2", "test2@email.com", "password2", None).unwrap();
        Fixture { db, u1, u2 }
    }

    fn db_error(err: anyhow::Error) -> DbError {
        err.downcast::<DbError>().expect("expected a DbError")
    }

    #[test]
    fn new_user_has_no_messages_or_followers() {
        let f = setup();
        assert!(f.db.messages_for_user(f.u1.id).unwrap().is_empty());
        assert!(f.db.followers(f.u1.id).unwrap().is_empty());
        assert!(f.db.following(f.u1.id).unwrap().is_empty());
        assert!(f.db.liked_messages(f.u1.id).unwrap().is_empty());
        assert_eq!(f.db.counts_for_user(f.u1.id).unwrap(), UserCounts::default());
    }

    #[test]
    fn user_display_matches_repr_format() {
        let f = setup();
        assert_eq!(
            f.u1.to_string(),
            format!("<User #{}: test1, test1@email.com>", f.u1.id)
        );
    }

    #[test]
    fn signup_stores_hash_and_default_images() {
        let f = setup();
        assert_ne!(f.u1.password, "password");
        assert_eq!(f.u1.image_url, DEFAULT_IMAGE_URL);
        assert_eq!(f.u1.header_image_url, DEFAULT_HEADER_IMAGE_URL);
        assert_eq!(f.u1.bio, None);

        let u = f
            .db
            .signup("testing", "user3@test.com", "123456", Some("test.com/image_1"))
            .unwrap();
        assert_eq!(u.image_url, "test.com/image_1");
        assert_eq!(f.db.get_user(u.id).unwrap(), Some(u));
    }

    #[test]
    fn signup_rejects_missing_fields() {
        let f = setup();
        let err = f.db.signup("iam3", "user3@test.com", "", None).unwrap_err();
        assert_eq!(db_error(err), DbError::MissingField("password"));

        let err = f.db.signup("  ", "user3@test.com", "secret", None).unwrap_err();
        assert_eq!(db_error(err), DbError::MissingField("username"));
    }

    #[test]
    fn signup_rejects_duplicates() {
        let f = setup();
        let err = f.db.signup("test1", "other@email.com", "password", None).unwrap_err();
        assert_eq!(db_error(err), DbError::UsernameTaken);

        let err = f.db.signup("other", "test1@email.com", "password", None).unwrap_err();
        assert_eq!(db_error(err), DbError::EmailTaken);
    }

    #[test]
    fn authenticate_requires_matching_password() {
        let f = setup();
        assert_eq!(f.db.authenticate("test1", "password").unwrap(), Some(f.u1.clone()));
        assert_eq!(f.db.authenticate("test1", "wrongpw").unwrap(), None);
        assert_eq!(f.db.authenticate("hihihi", "password").unwrap(), None);
    }

    #[test]
    fn follows_are_directional() {
        let f = setup();
        // u2 follows u1
        f.db.follow(f.u2.id, f.u1.id).unwrap();

        assert!(f.db.followers(f.u1.id).unwrap().contains(&f.u2));
        assert!(!f.db.followers(f.u2.id).unwrap().contains(&f.u1));
        assert!(f.db.following(f.u2.id).unwrap().contains(&f.u1));
        assert!(f.db.is_following(f.u2.id, f.u1.id).unwrap());
        assert!(!f.db.is_following(f.u1.id, f.u2.id).unwrap());
        assert!(f.db.is_followed_by(f.u1.id, f.u2.id).unwrap());

        // Following twice keeps a single edge
        f.db.follow(f.u2.id, f.u1.id).unwrap();
        assert_eq!(f.db.followers(f.u1.id).unwrap().len(), 1);

        assert!(f.db.unfollow(f.u2.id, f.u1.id).unwrap());
        assert!(f.db.followers(f.u1.id).unwrap().is_empty());
        assert!(!f.db.unfollow(f.u2.id, f.u1.id).unwrap());
    }

    #[test]
    fn message_belongs_to_its_author() {
        let f = setup();
        let m = f.db.insert_message(f.u1.id, "Hello").unwrap();

        assert_eq!(f.db.message_author(&m).unwrap().id, f.u1.id);
        assert!(f.db.messages_for_user(f.u1.id).unwrap().contains(&m));
        assert!(f.db.messages_for_user(f.u2.id).unwrap().is_empty());
        assert_eq!(f.db.get_message(m.id).unwrap(), Some(m));
    }

    #[test]
    fn message_text_is_bounded() {
        let f = setup();
        let err = f.db.insert_message(f.u1.id, &"x".repeat(141)).unwrap_err();
        assert_eq!(db_error(err), DbError::MessageTooLong);

        let err = f.db.insert_message(f.u1.id, "   ").unwrap_err();
        assert_eq!(db_error(err), DbError::MissingField("text"));

        assert!(f.db.insert_message(f.u1.id, &"x".repeat(140)).is_ok());
    }

    #[test]
    fn message_requires_existing_user() {
        let f = setup();
        assert!(f.db.insert_message(12345, "orphan").is_err());
    }

    #[test]
    fn likes_belong_to_the_liker() {
        let f = setup();
        let m = f.db.insert_message(f.u1.id, "Hello").unwrap();
        f.db.add_like(f.u2.id, m.id).unwrap();

        assert!(f.db.liked_messages(f.u2.id).unwrap().contains(&m));
        assert!(!f.db.liked_messages(f.u1.id).unwrap().contains(&m));
        assert_eq!(f.db.liked_message_ids(f.u2.id).unwrap(), vec![m.id]);
    }

    #[test]
    fn toggle_like_flips_state() {
        let f = setup();
        let m = f.db.insert_message(f.u1.id, "Hello").unwrap();

        assert!(f.db.toggle_like(f.u2.id, m.id).unwrap());
        assert_eq!(f.db.counts_for_user(f.u2.id).unwrap().likes, 1);
        assert!(!f.db.toggle_like(f.u2.id, m.id).unwrap());
        assert!(f.db.liked_messages(f.u2.id).unwrap().is_empty());
    }

    #[test]
    fn home_timeline_covers_self_and_followed() {
        let f = setup();
        let u3 = f.db.signup("test3", "test3@email.com", "password3", None).unwrap();
        let own = f.db.insert_message(f.u1.id, "mine").unwrap();
        let followed = f.db.insert_message(f.u2.id, "followed").unwrap();
        f.db.insert_message(u3.id, "stranger").unwrap();
        f.db.follow(f.u1.id, f.u2.id).unwrap();

        let ids: Vec<i64> = f
            .db
            .home_timeline(f.u1.id, 100)
            .unwrap()
            .iter()
            .map(|a| a.message.id)
            .collect();
        assert_eq!(ids, vec![followed.id, own.id]);

        let limited = f.db.home_timeline(f.u1.id, 1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].author.username, "test2");
    }

    #[test]
    fn search_matches_username_substring() {
        let f = setup();
        assert_eq!(f.db.search_users(None).unwrap().len(), 2);
        assert_eq!(f.db.search_users(Some("")).unwrap().len(), 2);

        let found = f.db.search_users(Some("st2")).unwrap();
        assert_eq!(found, vec![f.u2.clone()]);
        // Wildcards match literally; case is ignored like SQLite's LIKE
        assert!(f.db.search_users(Some("_")).unwrap().is_empty());
        assert!(f.db.search_users(Some("%")).unwrap().is_empty());
        assert_eq!(f.db.search_users(Some("TEST1")).unwrap(), vec![f.u1.clone()]);
        assert!(f.db.search_users(Some("nobody")).unwrap().is_empty());
    }

    #[test]
    fn update_user_checks_uniqueness() {
        let f = setup();
        let update = ProfileUpdate {
            username: "renamed".into(),
            email: f.u1.email.clone(),
            bio: Some("hello there".into()),
            ..Default::default()
        };
        let updated = f.db.update_user(f.u1.id, &update).unwrap();
        assert_eq!(updated.username, "renamed");
        assert_eq!(updated.bio.as_deref(), Some("hello there"));
        assert_eq!(updated.image_url, DEFAULT_IMAGE_URL);

        let clash = ProfileUpdate {
            username: "test2".into(),
            email: f.u1.email.clone(),
            ..Default::default()
        };
        let err = f.db.update_user(f.u1.id, &clash).unwrap_err();
        assert_eq!(db_error(err), DbError::UsernameTaken);
    }

    #[test]
    fn deleting_user_cascades() {
        let f = setup();
        let m = f.db.insert_message(f.u1.id, "Hello").unwrap();
        f.db.add_like(f.u2.id, m.id).unwrap();
        f.db.follow(f.u2.id, f.u1.id).unwrap();

        assert!(f.db.delete_user(f.u1.id).unwrap());
        assert_eq!(f.db.get_message(m.id).unwrap(), None);
        assert!(f.db.liked_messages(f.u2.id).unwrap().is_empty());
        assert!(f.db.following(f.u2.id).unwrap().is_empty());
        assert!(!f.db.delete_user(f.u1.id).unwrap());
    }
}
