// All LLM prompt constants for the recommendation module.

/// System prompt for plan generation — pins the recommender persona and the
/// hard filtering rules.
pub const RECOMMENDER_SYSTEM: &str = "You are an expert children's book recommendation system \
    that carefully considers age appropriateness, reading preferences, and personal interests. \
    Your recommendations should:\n\
    1. Strictly match the reader's age range and interests\n\
    2. Only include books that would be enjoyable based on the provided preferences\n\
    3. Prioritize books that align with multiple interest areas\n\
    4. Consider reading level appropriateness\n\
    5. Exclude any books that don't match the specified genres or interests";

/// Recommendation prompt template.
/// Replace: {age}, {genres}, {interests}, {non_fiction}, {series_phrase},
///          {exclude_block}, {prioritize_block}, {book_text}
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"I need personalized book recommendations for a {age}-year-old reader with the following preferences:

GENRES THEY ENJOY: {genres}
SPECIFIC INTERESTS: {interests}
NON-FICTION INTERESTS: {non_fiction}
BOOK SERIES PREFERENCE: They {series_phrase} book series.

SERIES AND AUTHORS TO EXCLUDE (the reader did not enjoy these):
{exclude_block}

SERIES AND AUTHORS TO PRIORITIZE (the reader already loves these):
{prioritize_block}

Available books in our inventory:

{book_text}

📚 Please recommend book series and authors that PERFECTLY match these preferences. Group recommendations by author or series.

IMPORTANT GUIDELINES:
- Only include books that strongly match the specified genres and interests
- Ensure age appropriateness for a {age}-year-old reader
- If they don't prefer series, prioritize standalone books
- Never recommend anything from the exclude list
- Rank the prioritized series and authors ahead of comparable alternatives
- Focus on books that align with their specific interests
- Consider both fiction and non-fiction based on their preferences
- Exclude any books that don't match their interests or reading level

✅ Return recommendations as a JSON array with this structure:
[
  {
    "name": "Series/Author Name",
    "likely_score": X,  // Score 1-10 based on match with preferences
    "books": [
      "Book Title 1",
      "Book Title 2"
    ],
    "rationale": "Detailed explanation of why this matches their interests"
  }
]

🎯 Sort recommendations by likely_score (highest to lowest), only including entries with a score of 7 or higher. You MUST return at least 15 entries."#;
