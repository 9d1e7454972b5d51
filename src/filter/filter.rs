use crate::database::models::Movie;

use super::error::FilterError;
use super::types::MovieQuery;

/// In-memory movie list filter.
///
/// Steps run in a fixed order: genre, first letter, name, skip, limit.
pub struct MovieFilter {
    genre: Option<String>,
    letter: Option<char>,
    name: Option<String>,
    skip: Option<usize>,
    limit: Option<usize>,
}

impl MovieFilter {
    pub fn new(query: &MovieQuery) -> Result<Self, FilterError> {
        query.validate()?;
        Ok(Self {
            genre: query.genre.as_deref().map(str::to_lowercase),
            letter: query
                .letter
                .as_deref()
                .and_then(|l| l.chars().next())
                .map(fold_char),
            name: query.name.as_deref().map(str::to_lowercase),
            skip: query.skip,
            limit: query.limit,
        })
    }

    pub fn apply(&self, movies: Vec<Movie>) -> Vec<Movie> {
        let mut movies: Vec<Movie> = movies
            .into_iter()
            .filter(|m| self.matches_genre(m))
            .filter(|m| self.matches_letter(m))
            .filter(|m| self.matches_name(m))
            .collect();

        if let Some(skip) = self.skip {
            movies = movies.into_iter().skip(skip).collect();
        }
        if let Some(limit) = self.limit {
            if limit <= movies.len() {
                movies.truncate(limit);
            }
        }
        movies
    }

    // The query must contain the record's genre, not the other way round, so
    // `?genre=comedia,drama` matches both genres.
    fn matches_genre(&self, movie: &Movie) -> bool {
        match (&self.genre, movie.genre) {
            (None, _) => true,
            (Some(query), Some(genre)) => query.contains(&genre.as_str().to_lowercase()),
            (Some(_), None) => false,
        }
    }

    fn matches_letter(&self, movie: &Movie) -> bool {
        match self.letter {
            None => true,
            Some(letter) => movie.title.chars().next().map(fold_char) == Some(letter),
        }
    }

    fn matches_name(&self, movie: &Movie) -> bool {
        match &self.name {
            None => true,
            Some(name) => movie.title.to_lowercase().contains(name.as_str()),
        }
    }
}

fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
