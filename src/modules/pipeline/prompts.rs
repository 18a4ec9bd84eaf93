/// Prompt builders for the generation stages.
///
/// Prompt text is the contract with the completion service: each builder
/// states the task, the rules and the exact output shape the consuming
/// stage validates against.

pub fn document_summary(file_name: &str, text: &str) -> String {
    format!(
        r#"Please provide a comprehensive summary of this PDF document titled "{file_name}".

Include:
1. Main topics and themes
2. Key points and important concepts
3. Overall purpose/conclusion

PDF Content:
{text}

Provide a clear, structured summary in 2-3 paragraphs."#
    )
}

pub fn course_modules(course_name: &str, course_description: &str, materials: Option<&str>) -> String {
    let materials_section = match materials {
        Some(context) => format!(
            "Course Materials:\n{context}\n\nPlease analyze this content and create a learning plan \
             with reasonably-sized modules in a logical linear progression."
        ),
        None => "No course materials provided yet. Please create a comprehensive learning plan \
                 based on the course name and description. Design modules that would typically be \
                 covered in this type of course, including foundational concepts, intermediate \
                 topics, and advanced applications."
            .to_string(),
    };

    let description = if course_description.is_empty() {
        "Not provided"
    } else {
        course_description
    };

    format!(
        r#"You are a curriculum designer. Given a course and its materials, create a structured learning plan by organizing the content into logical modules/topics that build on each other.

Course Name: {course_name}
Course Description: {description}

{materials_section}

RULES:
1. Create 4-8 modules that build on each other sequentially
2. Each module should have a clear, descriptive name and detailed content from the materials
3. Start with foundational concepts and progressively build to advanced topics
4. Each module naturally builds on the knowledge from the previous module
5. The sequence should form a clear learning path from basics to mastery

Output your response as a JSON array of modules. Each module should have:
- "name": A clear, descriptive module name
- "content": Detailed content combining relevant information from the materials, explaining key concepts

IMPORTANT: Only output valid JSON. Do not include any text before or after the JSON array."#
    )
}

pub fn module_questions(module_name: &str, module_content: &str) -> String {
    format!(
        r#"You are an educational assessment designer. Create multiple choice questions to test understanding of this course module.

Module Name: {module_name}
Module Content: {module_content}

Please create 1-2 multiple choice questions that test the most important concepts from this module.

RULES:
1. Create 1-2 questions (choose 1 for simpler modules, 2 for complex modules)
2. Each question should have exactly 4 answer options
3. Questions should test understanding, not just memorization
4. Make incorrect options plausible but clearly wrong to someone who understands the material
5. Focus on the most critical concepts only
6. Questions should be clear and unambiguous

Output your response as a JSON array of questions. Each question should have:
- "question_text": The question to ask
- "options": Array of exactly 4 answer options (strings)
- "correct_answer_index": Index (0-3) of the correct option

IMPORTANT: Only output valid JSON. Do not include any text before or after the JSON array."#
    )
}

pub fn learning_coach(course_name: &str, module_name: &str, module_content: &str) -> String {
    format!(
        r#"You are an AI learning coach helping a student understand course material.

Course: {course_name}
Module: {module_name}

Module Content:
{module_content}

Your role is to:
- Help students understand the concepts covered in this module
- Answer questions clearly and concisely
- Provide examples when helpful
- Encourage critical thinking
- Be supportive and encouraging

IMPORTANT FORMATTING RULES:
- You do NOT have markdown formatting available
- Use plaintext only
- Use emojis to add visual interest and clarity (e.g., ✅ ❌ 💡 🎯 📝 ⚡ 🔑)
- Use line breaks to separate ideas
- Use simple text formatting like CAPS for emphasis
- Do NOT use **bold**, *italic*, `code`, or other markdown syntax

Keep your responses focused on the course material and learning objectives."#
    )
}

pub fn narration_script(module_name: &str, lesson_content: &str) -> String {
    format!(
        r#"You are an educational content creator. Write a clear, engaging narration script for a 30-60 second educational video.

Module: {module_name}
Content: {lesson_content}

Requirements:
1. Write in a friendly, conversational tone suitable for voice narration
2. Keep it concise (30-60 seconds when read aloud at normal pace)
3. Start with a hook to grab attention
4. Explain the concept clearly and simply
5. Use short sentences that flow well when spoken
6. End with a key takeaway or summary
7. Avoid complex jargon - use accessible language

IMPORTANT: Only output the narration script text - no additional formatting, labels, or explanations.

Generate the narration script now:"#
    )
}

pub fn animation_program(module_name: &str, lesson_content: &str, narration: &str) -> String {
    format!(
        r#"You are an expert at creating educational videos using Manim (Mathematical Animation Engine).

Generate a Manim scene that teaches the following concept with synchronized visuals:

Module: {module_name}
Content: {lesson_content}

Narration Script (this will be the audio):
"{narration}"

Requirements:
1. Create a single Scene class called "LessonScene" that inherits from Scene
2. The video should be 30-60 seconds long (matching the narration length)
3. Use clear, readable text (font size 36 or larger)
4. Time your animations to sync with the narration script
5. Use colors to highlight important concepts (WHITE, BLUE, GREEN, RED, YELLOW)
6. Break down complex ideas into simple, visual steps that complement the narration
7. Include a title at the start
8. Use manim's built-in animations like Write, FadeIn, FadeOut, Transform, Create, etc.
9. Use self.wait() strategically to pace animations with the expected narration timing

IMPORTANT: Only output valid Python code using Manim Community Edition (manim library).
Do not include any explanations or markdown formatting - only the Python code.

Now generate the complete Manim code:"#
    )
}
