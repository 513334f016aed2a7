//! Database archive
//!
//! [`DatabaseArchive`] couples the object model to a [`DbDriver`]: it
//! serializes object trees into `INSERT`/`UPDATE`/`DELETE` statements
//! following parent/child ownership, hydrates typed objects from cursor
//! rows, and maintains the identity cache mapping objects to their row ids.
//!
//! The driver lives in a shared slot so that closing the archive invalidates
//! every outstanding [`DatabaseIterator`]: their next advance observes the
//! empty slot and terminates.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use seisarc_core::error::{Result, SeisarcError};
use seisarc_core::{AttributeMap, DbDriver, Oid, SchemaVersion, INVALID_OID};

use crate::cache::IdentityCache;
use crate::iterator::DatabaseIterator;
use crate::object::{ArchiveObject, DomainClass};
use crate::registry::ClassInfo;
use crate::serializer::RowSerializer;

pub(crate) type SharedDriver = Arc<Mutex<Option<Box<dyn DbDriver>>>>;

const OBJECT_TABLE: &str = "Object";
const PUBLIC_OBJECT_TABLE: &str = "PublicObject";

/// Parent selector for child queries.
pub enum Parent<'a> {
    /// No parent constraint: all rows of the class.
    All,
    /// Children of the `PublicObject` with this publicID.
    PublicId(&'a str),
    /// Children of this in-memory object (resolved via the identity cache,
    /// falling back to its publicID).
    Object(&'a dyn ArchiveObject),
}

/// The serialize/deserialize facade coupling the object model to a driver.
pub struct DatabaseArchive {
    shared: SharedDriver,
    owns_driver: bool,
    cache: IdentityCache,
    version: SchemaVersion,
    public_id_column: String,
}

impl std::fmt::Debug for DatabaseArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseArchive")
            .field("owns_driver", &self.owns_driver)
            .field("version", &self.version)
            .field("public_id_column", &self.public_id_column)
            .finish()
    }
}

impl DatabaseArchive {
    /// Attach an existing driver. When the driver is already connected the
    /// schema version is read and gated immediately.
    pub fn new(driver: Box<dyn DbDriver>) -> Result<Self> {
        let public_id_column = driver.convert_column_name("publicID");
        let connected = driver.is_connected();

        let mut archive = Self {
            shared: Arc::new(Mutex::new(Some(driver))),
            owns_driver: false,
            cache: IdentityCache::new(),
            version: SchemaVersion::default(),
            public_id_column,
        };

        if connected {
            let version = {
                let mut guard = archive.shared.lock();
                let db = guard.as_deref_mut().expect("driver present");
                Self::fetch_version(db)
            }?;
            archive.version = version;
        }

        Ok(archive)
    }

    /// Connect to `dsn`, read and gate the schema version. The archive owns
    /// the connection afterwards and closes it on teardown.
    pub fn open(&mut self, dsn: &str) -> Result<()> {
        let version = {
            let mut guard = self.shared.lock();
            let db = guard
                .as_deref_mut()
                .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;
            if db.is_connected() {
                return Err(SeisarcError::Connection("already connected".into()));
            }

            db.connect(dsn)?;
            match Self::fetch_version(db) {
                Ok(version) => version,
                Err(e) => {
                    db.disconnect();
                    return Err(e);
                }
            }
        };

        self.version = version;
        self.owns_driver = true;
        info!("connect to {} succeeded", dsn);
        Ok(())
    }

    /// Disconnect when owning the connection, drop the driver slot and clear
    /// the identity cache. Outstanding iterators terminate on their next
    /// advance.
    pub fn close(&mut self) {
        let mut guard = self.shared.lock();
        if let Some(db) = guard.as_deref_mut() {
            if self.owns_driver {
                db.disconnect();
            }
        }
        *guard = None;
        drop(guard);
        self.cache.clear();
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn identity_cache(&self) -> &IdentityCache {
        &self.cache
    }

    /// Cached row id of `object`, if a prior operation registered one.
    pub fn cached_id(&self, object: &dyn ArchiveObject) -> Option<Oid> {
        self.cache.cached_id(object.core().identity_id())
    }

    /// Run `f` against the raw driver, for queries outside the archive's
    /// surface.
    pub fn with_driver<R>(&self, f: impl FnOnce(&mut dyn DbDriver) -> R) -> Result<R> {
        let mut guard = self.shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;
        Ok(f(db))
    }

    pub fn start(&mut self) -> Result<()> {
        self.with_driver(|db| db.start())?
    }

    pub fn commit(&mut self) -> Result<()> {
        self.with_driver(|db| db.commit())?
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.with_driver(|db| db.rollback())?
    }

    pub fn execute(&mut self, sql: &str) -> Result<()> {
        self.with_driver(|db| db.execute(sql))?
    }

    fn fetch_version(db: &mut dyn DbDriver) -> Result<SchemaVersion> {
        if db
            .begin_query("select value from Meta where name='Schema-Version'")
            .is_err()
        {
            warn!("unable to read schema version from database, assuming v0.0");
            return Ok(SchemaVersion::default());
        }

        if !db.fetch_row() {
            db.end_query();
            return Err(SeisarcError::Schema(
                "unable to read schema version from database (empty result set)".into(),
            ));
        }

        let raw = db
            .row_field(0)
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .unwrap_or_default();
        db.end_query();

        let version: SchemaVersion = raw
            .parse()
            .map_err(|_| SeisarcError::Schema(format!("invalid schema version in database: {}", raw)))?;

        if version > SchemaVersion::SUPPORTED {
            let message = format!(
                "database version v{}.{} not supported by client",
                version.major, version.minor
            );
            error!("{}", message);
            return Err(SeisarcError::Schema(message));
        }

        debug!("found database version v{}", version);
        Ok(version)
    }

    fn public_object_id(&self, db: &mut dyn DbDriver, public_id: &str) -> Result<Oid> {
        let sql = format!(
            "select _oid from {} where {}='{}'",
            PUBLIC_OBJECT_TABLE,
            self.public_id_column,
            db.escape(public_id)
        );
        db.begin_query(&sql)?;

        let mut oid = INVALID_OID;
        if db.fetch_row() {
            if let Some(field) = db.row_field(0) {
                oid = parse_oid(field).unwrap_or(INVALID_OID);
            }
        }
        db.end_query();
        Ok(oid)
    }

    fn insert_object(db: &mut dyn DbDriver) -> Result<Oid> {
        let sql = format!(
            "insert into {}(_oid) values({})",
            OBJECT_TABLE,
            db.default_value()
        );
        db.execute(&sql)?;
        db.last_insert_id(OBJECT_TABLE)
    }

    fn insert_public_object(&self, db: &mut dyn DbDriver, public_id: &str) -> Result<Oid> {
        if public_id.is_empty() {
            return Err(SeisarcError::InvalidState("empty publicID".into()));
        }

        let oid = Self::insert_object(db)?;
        let sql = format!(
            "insert into {}(_oid,{}) values({},'{}')",
            PUBLIC_OBJECT_TABLE,
            self.public_id_column,
            oid,
            db.escape(public_id)
        );
        if let Err(e) = db.execute(&sql) {
            Self::delete_object(db, oid);
            return Err(e);
        }
        Ok(oid)
    }

    fn delete_object(db: &mut dyn DbDriver, oid: Oid) {
        debug!("deleting object with id {}", oid);
        let sql = format!("delete from {} where _oid={}", OBJECT_TABLE, oid);
        if let Err(e) = db.execute(&sql) {
            error!("could not delete object row {}: {}", oid, e);
        }
    }

    /// Undo the provisional rows of a failed write. Public objects also drop
    /// their `PublicObject` row; leaving it behind would orphan the publicID
    /// and block any later write under the same id.
    fn compensate(db: &mut dyn DbDriver, oid: Oid, is_public: bool) {
        if is_public {
            let sql = format!("delete from {} where _oid={}", PUBLIC_OBJECT_TABLE, oid);
            if let Err(e) = db.execute(&sql) {
                error!("could not delete public object row {}: {}", oid, e);
            }
        }
        Self::delete_object(db, oid);
    }

    fn insert_row(db: &mut dyn DbDriver, table: &str, attributes: &AttributeMap) -> Result<()> {
        let sql = format!(
            "insert into {}({}) values({})",
            table,
            attributes.columns(),
            attributes.values()
        );
        db.execute(&sql)
    }

    /// Resolve the parent row id: the in-memory link wins (cache first,
    /// publicID lookup second), then the explicit `parent_id`. `Ok(None)`
    /// means no parent was given at all.
    fn resolve_parent_oid(
        &self,
        db: &mut dyn DbDriver,
        object: &dyn ArchiveObject,
        parent_id: &str,
    ) -> Result<Option<Oid>> {
        if let Some(link) = object.core().parent() {
            let mut oid = self.cache.cached_id(link.identity).unwrap_or(INVALID_OID);
            if oid == INVALID_OID {
                oid = self.public_object_id(db, &link.public_id)?;
                if oid != INVALID_OID {
                    self.cache.register(link.identity, oid);
                } else {
                    error!(
                        "parent object with publicID '{}' has not been found in the database",
                        link.public_id
                    );
                    return Err(SeisarcError::ParentNotFound(link.public_id.clone()));
                }
            }
            return Ok(Some(oid));
        }

        if !parent_id.is_empty() {
            let oid = self.public_object_id(db, parent_id)?;
            if oid == INVALID_OID {
                error!(
                    "parent object with publicID '{}' has not been found in the database",
                    parent_id
                );
                return Err(SeisarcError::ParentNotFound(parent_id.to_string()));
            }
            return Ok(Some(oid));
        }

        Ok(None)
    }

    /// Persist `object` as a new row. Refuses duplicate publicIDs; a
    /// provisional `Object` row is compensated by a delete on any failure.
    pub fn write(&mut self, object: &mut dyn ArchiveObject, parent_id: &str) -> Result<()> {
        let class = object.class();
        let shared = self.shared.clone();
        let mut guard = shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

        let oid = match object.public_id() {
            Some(public_id) => {
                let public_id = public_id.to_string();
                if self.public_object_id(db, &public_id)? != INVALID_OID {
                    error!("object with publicID '{}' exists already", public_id);
                    return Err(SeisarcError::DuplicatePublicId(public_id));
                }
                self.insert_public_object(db, &public_id).map_err(|e| {
                    error!("writing object with publicID '{}' failed", public_id);
                    e
                })?
            }
            None => Self::insert_object(db)?,
        };

        let is_public = object.public_id().is_some();

        let mut serializer = RowSerializer::writer(db, false);
        let serialize_result = object.serialize(&mut serializer);
        let row = serializer.into_row();

        if serialize_result.is_err() || !row.valid {
            error!("serializing object with type '{}' failed", class.name);
            Self::compensate(db, oid, is_public);
            return serialize_result.and(Err(SeisarcError::Serialization(format!(
                "serializing object with type '{}' failed",
                class.name
            ))));
        }

        let mut attributes = row.root;
        attributes.set("_oid", Some(oid.to_string()));

        let parent_oid = match self.resolve_parent_oid(db, object, parent_id) {
            Ok(parent_oid) => parent_oid,
            Err(e) => {
                Self::compensate(db, oid, is_public);
                return Err(e);
            }
        };

        match parent_oid {
            Some(parent_oid) => {
                attributes.set("_parent_oid", Some(parent_oid.to_string()));
            }
            None if !class.root => {
                Self::compensate(db, oid, is_public);
                return Err(SeisarcError::InvalidState(format!(
                    "objects of type '{}' cannot be stored without a parent",
                    class.name
                )));
            }
            None => {}
        }

        if let Err(e) = Self::insert_row(db, class.name, &attributes) {
            error!("writing object with type '{}' failed", class.name);
            Self::compensate(db, oid, is_public);
            return Err(e);
        }

        self.cache.register(object.core().identity_id(), oid);
        Ok(())
    }

    /// Regenerate the attribute and index maps and issue an UPDATE against
    /// the row identified by the object's logical index (or its oid for
    /// public objects).
    pub fn update(&mut self, object: &mut dyn ArchiveObject, parent_id: &str) -> Result<()> {
        let class = object.class();
        let shared = self.shared.clone();
        let mut guard = shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

        let parent_oid = self.resolve_parent_oid(db, object, parent_id)?.ok_or_else(|| {
            error!("update: no parent object given, aborting update");
            SeisarcError::InvalidState("update: no parent object given".into())
        })?;

        let own_oid = match object.public_id() {
            Some(public_id) => {
                let identity = object.core().identity_id();
                let mut oid = self.cache.cached_id(identity).unwrap_or(INVALID_OID);
                if oid == INVALID_OID {
                    oid = self.public_object_id(db, public_id)?;
                    if oid != INVALID_OID {
                        self.cache.register(identity, oid);
                    }
                }
                if oid == INVALID_OID {
                    error!(
                        "update: object with publicID '{}' has not been found in the database",
                        public_id
                    );
                    return Err(SeisarcError::ObjectNotFound(public_id.to_string()));
                }
                Some(oid)
            }
            None => None,
        };

        let mut serializer = RowSerializer::writer(db, own_oid.is_none());
        let serialize_result = object.serialize(&mut serializer);
        let row = serializer.into_row();
        if serialize_result.is_err() || !row.valid {
            error!("serializing updated object with type '{}' failed", class.name);
            return serialize_result.and(Err(SeisarcError::Serialization(format!(
                "serializing updated object with type '{}' failed",
                class.name
            ))));
        }

        if row.root.is_empty() {
            debug!(
                "no update for object type '{}' possible, empty list of non-index attributes",
                class.name
            );
            return Ok(());
        }

        let mut index = row.index;
        if let Some(oid) = own_oid {
            index.set("_oid", Some(oid.to_string()));
        }
        if index.is_empty() {
            error!("update: index is empty, no update possible");
            return Err(SeisarcError::InvalidState(
                "update: index is empty, no update possible".into(),
            ));
        }
        index.set("_parent_oid", Some(parent_oid.to_string()));

        let sql = format!(
            "update {} set {} where {}",
            class.name,
            row.root.assignments(),
            index.filter()
        );
        db.execute(&sql)
    }

    /// Delete the object's class row, its `PublicObject` row when
    /// applicable, and its `Object` row. An object absent from the database
    /// is not an error.
    pub fn remove(&mut self, object: &mut dyn ArchiveObject, parent_id: &str) -> Result<()> {
        let class = object.class();
        let identity = object.core().identity_id();

        let oid = match self.cache.cached_id(identity) {
            Some(oid) => oid,
            None => self.object_id(object, parent_id)?,
        };

        if oid == INVALID_OID {
            warn!(
                "remove: object '{}' has not been found in database",
                class.name
            );
            return Ok(());
        }

        let shared = self.shared.clone();
        let mut guard = shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

        db.execute(&format!(
            "delete from {} where _oid={}",
            class.name, oid
        ))?;
        if object.public_id().is_some() {
            db.execute(&format!(
                "delete from {} where _oid={}",
                PUBLIC_OBJECT_TABLE, oid
            ))?;
        }
        Self::delete_object(db, oid);
        self.cache.remove(identity);
        Ok(())
    }

    /// Resolve the row id of `object` without writing: by publicID for
    /// public objects, otherwise by content: its index attributes plus the
    /// parent's oid.
    pub fn object_id(&mut self, object: &mut dyn ArchiveObject, parent_id: &str) -> Result<Oid> {
        let class = object.class();
        let shared = self.shared.clone();
        let mut guard = shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

        if let Some(public_id) = object.public_id() {
            let public_id = public_id.to_string();
            return self.public_object_id(db, &public_id);
        }

        let parent_oid = self.resolve_parent_oid(db, object, parent_id)?.ok_or_else(|| {
            error!("objectId: no parent object given");
            SeisarcError::InvalidState("objectId: no parent object given".into())
        })?;

        let mut serializer = RowSerializer::writer(db, true);
        let serialize_result = object.serialize(&mut serializer);
        let row = serializer.into_row();
        if serialize_result.is_err() || !row.valid {
            error!("objectId: serializing object with type '{}' failed", class.name);
            return serialize_result.and(Err(SeisarcError::Serialization(format!(
                "objectId: serializing object with type '{}' failed",
                class.name
            ))));
        }

        let mut index = row.index;
        if index.is_empty() {
            warn!("objectId: index of type '{}' is empty", class.name);
            index = row.root;
        }
        index.set("_parent_oid", Some(parent_oid.to_string()));

        let sql = format!(
            "select _oid from {} where {}",
            class.name,
            index.filter()
        );
        db.begin_query(&sql)?;

        let mut oid = INVALID_OID;
        if db.fetch_row() {
            if let Some(field) = db.row_field(0) {
                oid = parse_oid(field).unwrap_or(INVALID_OID);
            }
        }
        db.end_query();
        Ok(oid)
    }

    /// Fetch the `PublicObject` with the given publicID, hydrated as `C`.
    pub fn get_object<C: DomainClass>(&mut self, public_id: &str) -> Result<Option<Box<C>>> {
        let object = self.get_object_dyn(C::class_info(), public_id)?;
        Ok(object.and_then(|object| object.into_any().downcast::<C>().ok()))
    }

    /// Untyped variant of [`DatabaseArchive::get_object`].
    pub fn get_object_dyn(
        &mut self,
        class: &'static ClassInfo,
        public_id: &str,
    ) -> Result<Option<Box<dyn ArchiveObject>>> {
        if !class.public {
            return Ok(None);
        }

        let escaped = self.with_driver(|db| db.escape(public_id))?;
        let sql = format!(
            "select {po}.{col},{class}.* from {po},{class} \
             where {po}._oid={class}._oid and {po}.{col}='{id}'",
            po = PUBLIC_OBJECT_TABLE,
            col = self.public_id_column,
            class = class.name,
            id = escaped
        );
        self.query_object(class, &sql)
    }

    /// Execute an arbitrary single-row select and hydrate the result into
    /// `class`. An empty result set is `Ok(None)`.
    pub fn query_object(
        &mut self,
        class: &'static ClassInfo,
        sql: &str,
    ) -> Result<Option<Box<dyn ArchiveObject>>> {
        let shared = self.shared.clone();
        let mut guard = shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

        if let Err(e) = db.begin_query(sql) {
            error!("query [{}] failed: {}", sql, e);
            return Err(e);
        }
        if !db.fetch_row() {
            db.end_query();
            return Ok(None);
        }

        let mut object = class.create();
        let hydrated = hydrate_current_row(db, &self.cache, object.as_mut());
        db.end_query();

        if hydrated {
            Ok(Some(object))
        } else {
            Ok(None)
        }
    }

    /// Cursor over all `class` children of `parent`. An unknown parent
    /// yields a closed iterator.
    pub fn get_objects(
        &mut self,
        parent: Parent<'_>,
        class: &'static ClassInfo,
        ignore_public_object: bool,
    ) -> Result<DatabaseIterator> {
        let parent_oid = match self.lookup_parent(parent)? {
            Some(oid) => oid,
            None => return Ok(DatabaseIterator::closed(class)),
        };

        let joined = class.public && !ignore_public_object;
        let mut sql = if joined {
            format!(
                "select {po}.{col},{class}.* from {po},{class} where {po}._oid={class}._oid",
                po = PUBLIC_OBJECT_TABLE,
                col = self.public_id_column,
                class = class.name
            )
        } else {
            format!("select * from {}", class.name)
        };

        if parent_oid > 0 {
            sql.push_str(if joined { " and " } else { " where " });
            sql.push_str(&format!("{}._parent_oid='{}'", class.name, parent_oid));
        }

        self.object_iterator(&sql, class)
    }

    /// Number of `class` children below `parent`.
    pub fn object_count(&mut self, parent: Parent<'_>, class: &'static ClassInfo) -> Result<usize> {
        let parent_public_id = match parent {
            Parent::All => None,
            Parent::PublicId(public_id) => Some(public_id.to_string()),
            Parent::Object(object) => match object.public_id() {
                Some(public_id) => Some(public_id.to_string()),
                None => return Ok(0),
            },
        };

        let mut sql = format!("select count(*) from {}", class.name);
        if let Some(public_id) = parent_public_id {
            let escaped = self.with_driver(|db| db.escape(&public_id))?;
            sql.push_str(&format!(
                ",{po} where {po}._oid={class}._parent_oid and {po}.{col}='{id}'",
                po = PUBLIC_OBJECT_TABLE,
                class = class.name,
                col = self.public_id_column,
                id = escaped
            ));
        }

        let shared = self.shared.clone();
        let mut guard = shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

        db.begin_query(&sql)?;
        let mut count = 0;
        if db.fetch_row() {
            if let Some(field) = db.row_field(0) {
                count = std::str::from_utf8(field)
                    .ok()
                    .and_then(|text| text.parse().ok())
                    .unwrap_or(0);
            }
        }
        db.end_query();
        Ok(count)
    }

    /// Resolve a child's parent's publicID through the Parent/Child
    /// self-join on `PublicObject`.
    pub fn parent_public_id(&mut self, object: &dyn ArchiveObject) -> Result<Option<String>> {
        let public_id = match object.public_id() {
            Some(public_id) => public_id.to_string(),
            None => return Ok(None),
        };

        let shared = self.shared.clone();
        let mut guard = shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

        let sql = format!(
            "select Parent.{col} from {po} as Parent, {po} as Child, {class} \
             where Child._oid={class}._oid and Parent._oid={class}._parent_oid \
             and Child.{col}='{id}'",
            col = self.public_id_column,
            po = PUBLIC_OBJECT_TABLE,
            class = object.class().name,
            id = db.escape(&public_id)
        );
        db.begin_query(&sql)?;

        let mut result = None;
        if db.fetch_row() {
            result = db
                .row_field(0)
                .map(|field| String::from_utf8_lossy(field).into_owned());
        }
        db.end_query();
        Ok(result)
    }

    fn lookup_parent(&mut self, parent: Parent<'_>) -> Result<Option<Oid>> {
        let shared = self.shared.clone();
        let mut guard = shared.lock();
        let db = guard
            .as_deref_mut()
            .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

        match parent {
            Parent::All => Ok(Some(0)),
            Parent::PublicId(public_id) => {
                let oid = self.public_object_id(db, public_id)?;
                if oid == INVALID_OID {
                    info!("parent object with id '{}' not found in database", public_id);
                    return Ok(None);
                }
                Ok(Some(oid))
            }
            Parent::Object(object) => {
                let Some(public_id) = object.public_id() else {
                    info!("parent object carries no publicID");
                    return Ok(None);
                };
                let identity = object.core().identity_id();
                let mut oid = self.cache.cached_id(identity).unwrap_or(INVALID_OID);
                if oid == INVALID_OID {
                    oid = self.public_object_id(db, public_id)?;
                    if oid == INVALID_OID {
                        info!("parent object with id '{}' not found in database", public_id);
                        return Ok(None);
                    }
                    self.cache.register(identity, oid);
                }
                Ok(Some(oid))
            }
        }
    }

    fn object_iterator(&mut self, sql: &str, class: &'static ClassInfo) -> Result<DatabaseIterator> {
        {
            let mut guard = self.shared.lock();
            let db = guard
                .as_deref_mut()
                .ok_or_else(|| SeisarcError::Connection("no database driver".into()))?;

            if let Err(e) = db.begin_query(sql) {
                error!("starting query '{}' failed: {}", sql, e);
                return Err(e);
            }
            if !db.fetch_row() {
                db.end_query();
                return Ok(DatabaseIterator::closed(class));
            }
        }

        Ok(DatabaseIterator::open(
            self.shared.clone(),
            self.cache.clone(),
            class,
        ))
    }
}

impl Drop for DatabaseArchive {
    fn drop(&mut self) {
        self.close();
    }
}

pub(crate) fn parse_oid(field: &[u8]) -> Option<Oid> {
    std::str::from_utf8(field).ok()?.trim().parse().ok()
}

/// Hydrate `object` from the cursor's current row and register its oid in
/// the identity cache. Returns `false` when the row could not be decoded.
pub(crate) fn hydrate_current_row(
    db: &mut dyn DbDriver,
    cache: &IdentityCache,
    object: &mut dyn ArchiveObject,
) -> bool {
    let mut serializer = RowSerializer::reader(db);
    let result = object.serialize(&mut serializer);
    let valid = serializer.success();
    drop(serializer);

    if result.is_err() || !valid {
        return false;
    }

    if let Some(index) = db.find_column("_oid") {
        if let Some(oid) = db.row_field(index).and_then(parse_oid) {
            cache.register(object.core().identity_id(), oid);
        }
    }
    true
}
