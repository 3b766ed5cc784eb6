pub const SCHEMA_SQL: &str = "\
CREATE TABLE IF NOT EXISTS users (
	user_id text PRIMARY KEY,
	name text NOT NULL,
	bio text,
	longitude double precision,
	latitude double precision,
	address text,
	preferred_genres text[] NOT NULL DEFAULT '{}',
	preferred_authors text[] NOT NULL DEFAULT '{}',
	preferred_languages text[] NOT NULL DEFAULT '{}',
	CHECK ((longitude IS NULL) = (latitude IS NULL))
);
CREATE TABLE IF NOT EXISTS books (
	book_id text PRIMARY KEY,
	owner_id text NOT NULL REFERENCES users (user_id) ON DELETE CASCADE,
	title text NOT NULL,
	author text NOT NULL,
	genre text NOT NULL,
	language text NOT NULL,
	rating double precision NOT NULL DEFAULT 0,
	reviews integer NOT NULL DEFAULT 0 CHECK (reviews >= 0),
	available boolean NOT NULL DEFAULT true,
	description text NOT NULL DEFAULT '',
	longitude double precision,
	latitude double precision,
	address text,
	CHECK ((longitude IS NULL) = (latitude IS NULL))
);
CREATE INDEX IF NOT EXISTS books_owner_id_idx ON books (owner_id);
CREATE TABLE IF NOT EXISTS circles (
	circle_id text PRIMARY KEY,
	creator_id text NOT NULL,
	name text NOT NULL,
	description text NOT NULL DEFAULT '',
	privacy text NOT NULL DEFAULT 'public',
	longitude double precision,
	latitude double precision,
	address text,
	CHECK ((longitude IS NULL) = (latitude IS NULL))
);
CREATE INDEX IF NOT EXISTS circles_creator_id_idx ON circles (creator_id);
CREATE TABLE IF NOT EXISTS circle_members (
	circle_id text NOT NULL REFERENCES circles (circle_id) ON DELETE CASCADE,
	user_id text NOT NULL,
	joined_at timestamptz NOT NULL DEFAULT now(),
	PRIMARY KEY (circle_id, user_id)
);
CREATE INDEX IF NOT EXISTS circle_members_user_id_idx ON circle_members (user_id)";
