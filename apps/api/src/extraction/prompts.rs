// Prompt text for resume extraction. The output schema is the contract;
// the wording and the per-section limits are tunable.

pub const EXTRACTION_PROMPT: &str = r#"Extract the portfolio-relevant information from the attached resume pages. Keep only what belongs on a personal portfolio website:

1. NAME: full name, from the header
2. EMAIL: email address, from the header
3. LOCATION: city and state or country (optional)
4. SUMMARY: professional summary or objective, at most 2-3 concise sentences
5. EXPERIENCE: only the 2-3 most recent or relevant positions, each with
   - job title
   - company name
   - duration ("Start Date - End Date")
   - a brief description with 2-3 key achievements or responsibilities
6. EDUCATION: only the highest or most relevant degree, with degree name, institution and year (optional)
7. SKILLS: the 8-12 most relevant skills, technical skills first
8. PROJECTS: the 2-4 strongest projects, each with a title, a 1-3 sentence description, and the key technologies as one comma-separated string (e.g. "React, Node.js, PostgreSQL")

Leave out phone numbers, certifications and less relevant history.

Respond with a single JSON object in exactly this shape:
{
  "name": "Full Name",
  "email": "email@example.com",
  "location": "City, State/Country",
  "summary": "Concise professional summary",
  "experience": [
    {"title": "Job Title", "company": "Company Name", "duration": "Start Date - End Date", "description": "Brief description"}
  ],
  "education": [
    {"degree": "Degree Name", "institution": "Institution Name", "year": "Year"}
  ],
  "skills": ["Skill 1", "Skill 2", "Skill 3"],
  "projects": [
    {"title": "Project Title", "description": "Short description.", "technologies": "React, Node.js, PostgreSQL"}
  ]
}

Use null for any text field that is not present and [] for any list that is not present. Return ONLY the JSON object."#;
